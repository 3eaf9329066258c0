//! The transport capability injected into `DogPatchClient`.
//!
//! # Design
//! The client never owns a network stack. A `Transport` turns a URL plus a
//! completion handler into a `DataTask`; the task does nothing until it is
//! resumed, and once resumed the transport calls the handler exactly once
//! with `(body, response, error)`. Any implementation works: a blocking
//! `ureq` agent on a worker thread, a C host driving I/O through the FFI
//! crate, or a recording mock in tests.

use std::error::Error;

use url::Url;

use crate::http::HttpResponse;

/// Opaque failure reported by a transport before any response was obtained.
pub type TransportError = Box<dyn Error + Send + Sync + 'static>;

/// Called by the transport exactly once per resumed task.
pub type CompletionHandler =
    Box<dyn FnOnce(Option<Vec<u8>>, Option<HttpResponse>, Option<TransportError>) + Send + 'static>;

/// Handle to a single request issued through a `Transport`.
pub trait DataTask {
    /// The URL the task was created for.
    fn url(&self) -> &Url;

    /// Start the request. Calling it again after the first time has no effect.
    fn resume(&self);

    /// Abandon the request. A transport that has not yet completed the task
    /// reports [`Cancelled`] through the completion handler.
    fn cancel(&self);
}

/// Issues GET requests on behalf of the client.
pub trait Transport {
    type Task: DataTask;

    /// Create, but do not start, a GET request for `url`.
    fn data_task(&self, url: Url, completion: CompletionHandler) -> Self::Task;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Task = T::Task;

    fn data_task(&self, url: Url, completion: CompletionHandler) -> Self::Task {
        (**self).data_task(url, completion)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    type Task = T::Task;

    fn data_task(&self, url: Url, completion: CompletionHandler) -> Self::Task {
        (**self).data_task(url, completion)
    }
}

/// Reported as the transport error of a task cancelled before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request cancelled")]
pub struct Cancelled;
