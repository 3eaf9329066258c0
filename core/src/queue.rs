//! Execution contexts that completion handlers can be redirected onto.
//!
//! A client built without a response queue runs its completion handler on
//! whichever thread the transport completes on. With a queue, the handler is
//! boxed into a [`Job`] and dispatched.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use tracing::warn;

/// A unit of work handed to a `ResponseQueue`.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere completion handlers can be sent to run.
pub trait ResponseQueue: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// A labelled queue backed by one dedicated worker thread.
///
/// Jobs run one at a time in dispatch order on a thread named after the
/// label. A job that panics is logged and discarded; the worker keeps
/// serving later jobs. The worker exits once the queue is dropped and its
/// backlog drained.
#[derive(Debug)]
pub struct SerialQueue {
    label: String,
    sender: mpsc::Sender<Job>,
}

impl SerialQueue {
    /// Spawn the worker thread.
    ///
    /// # Errors
    /// Fails if the OS refuses to spawn the thread.
    pub fn new(label: impl Into<String>) -> std::io::Result<Self> {
        let label = label.into();
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker_label = label.clone();
        thread::Builder::new().name(label.clone()).spawn(move || {
            for job in receiver {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
                    warn!(
                        label = %worker_label,
                        panic = panic_message(panic.as_ref()),
                        "completion handler panicked"
                    );
                }
            }
        })?;
        Ok(Self { label, sender })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl ResponseQueue for SerialQueue {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            warn!(label = %self.label, "response queue worker has exited, dropping job");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("(non-string panic)")
}

/// Runs each job as a task on the runtime.
///
/// A panicking job only fails its own task. Jobs dispatched after the runtime
/// has shut down are dropped without running.
#[cfg(feature = "tokio")]
impl ResponseQueue for tokio::runtime::Handle {
    fn dispatch(&self, job: Job) {
        drop(self.spawn(async move { job() }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn jobs_run_on_the_labelled_thread() {
        let queue = SerialQueue::new("dogpatch.tests.serial").unwrap();
        assert_eq!(queue.label(), "dogpatch.tests.serial");

        let (tx, rx) = mpsc::channel();
        queue.dispatch(Box::new(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        }));

        let name = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(name.as_deref(), Some("dogpatch.tests.serial"));
    }

    #[test]
    fn jobs_run_in_dispatch_order() {
        let queue = SerialQueue::new("dogpatch.tests.order").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel();

        for i in 0..10 {
            let seen = Arc::clone(&seen);
            queue.dispatch(Box::new(move || seen.lock().unwrap().push(i)));
        }
        queue.dispatch(Box::new(move || tx.send(()).unwrap()));

        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn worker_survives_a_panicking_job() {
        let queue = SerialQueue::new("dogpatch.tests.panic").unwrap();
        let (tx, rx) = mpsc::channel();

        queue.dispatch(Box::new(|| panic!("completion handler blew up")));
        queue.dispatch(Box::new(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        }));

        let name = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(name.as_deref(), Some("dogpatch.tests.panic"));
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let literal: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(literal.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "(non-string panic)");
    }
}
