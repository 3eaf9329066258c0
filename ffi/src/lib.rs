//! C-ABI wrapper around `dogpatch-core`.
//!
//! # Overview
//! Exposes `DogPatchClient::get_dogs` through `extern "C"` functions. The C
//! host plays the transport: it asks a task for its URL, performs the GET
//! with whatever HTTP stack it has, and hands status, body and any transport
//! error back to `dogpatch_task_complete`. The core classifies the outcome
//! and invokes the host's callback exactly once.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The callback runs synchronously inside `dogpatch_task_complete` or
//!   `dogpatch_task_cancel`, on the host's calling thread.
//! - The C caller owns all returned pointers and must call the matching
//!   `dogpatch_*_free` function to release them.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use dogpatch_core::{DataTask, DogPatchClient, HttpResponse, TransportError};
use tracing::warn;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `DogPatchClient` bound to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8, not an absolute URL, or if
/// an internal panic occurs. The caller must free the returned pointer with
/// `dogpatch_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_client_new(base_url: *const c_char) -> *mut FfiDogPatchClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        match DogPatchClient::from_base_str(url, HostTransport, None) {
            Ok(inner) => Box::into_raw(Box::new(FfiDogPatchClient { inner })),
            Err(err) => {
                warn!(error = %err, "rejected base URL");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `dogpatch_client_new`. Safe to call with null.
///
/// Tasks already issued by the client stay valid.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_client_free(client: *mut FfiDogPatchClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create an unstarted task that fetches the dog listing.
///
/// `callback` is invoked exactly once with `user_data` when the task is
/// completed or cancelled. Returns null if `client` or `callback` is null.
/// The caller must free the task with `dogpatch_task_free`.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_get_dogs(
    client: *const FfiDogPatchClient,
    callback: Option<FfiDogsCallback>,
    user_data: *mut c_void,
) -> *mut FfiDataTask {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(callback) = callback else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let user_data = UserData::new(user_data);
        let issued = client.inner.get_dogs(move |result| {
            callback(FfiDogsResult::from_core(result), user_data.as_ptr());
        });
        match issued {
            Ok(task) => Box::into_raw(Box::new(task)),
            Err(err) => {
                warn!(error = %err, "could not create dogs task");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Task functions
// ---------------------------------------------------------------------------

/// The URL the host must GET for this task.
///
/// Returns null if `task` is null. Free with `dogpatch_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_url(task: *const FfiDataTask) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if task.is_null() {
            return std::ptr::null_mut();
        }
        let task = unsafe { &*task };
        to_c_string(task.url().as_str())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Mark the task as started. The host should only perform I/O for resumed
/// tasks.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_resume(task: *const FfiDataTask) {
    if task.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &*task }.resume();
    }));
}

/// Whether `dogpatch_task_resume` has been called. False for null.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_is_resumed(task: *const FfiDataTask) -> bool {
    if task.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { &*task }.is_resumed())).unwrap_or(false)
}

/// Cancel the task. If it has not completed yet, the callback fires now with
/// a `Transport` error.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_cancel(task: *const FfiDataTask) {
    if task.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &*task }.cancel();
    }));
}

/// Report the outcome of the host's GET.
///
/// - `response` null: no response metadata was obtained.
/// - `response.body` null: no body was obtained.
/// - `transport_error` non-null: the request failed before a response; its
///   message is passed through to the callback.
///
/// Runs the callback synchronously. Returns false if `task` is null or the
/// task already completed or was cancelled.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_complete(
    task: *const FfiDataTask,
    response: *const FfiHttpResponse,
    transport_error: *const c_char,
) -> bool {
    if task.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let task = unsafe { &*task };

        let (body, metadata) = if response.is_null() {
            (None, None)
        } else {
            let resp = unsafe { &*response };
            let body = if resp.body.is_null() {
                None
            } else {
                Some(unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec())
            };
            (body, Some(HttpResponse::new(task.url().clone(), resp.status)))
        };

        let error: Option<TransportError> = if transport_error.is_null() {
            None
        } else {
            let msg = unsafe { CStr::from_ptr(transport_error) }
                .to_string_lossy()
                .into_owned();
            Some(Box::new(HostTransportError(msg)))
        };

        task.complete(body, metadata, error)
    }))
    .unwrap_or(false)
}

/// Free a task returned by `dogpatch_get_dogs`. Safe to call with null.
///
/// A task freed before completion never invokes its callback.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_task_free(task: *mut FfiDataTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(task) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiDogsResult` delivered to a callback. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_free_result(result: *mut FfiDogsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.dogs.is_null() {
            let list = unsafe { Box::from_raw(result.dogs) };
            if !list.items.is_null() && list.len > 0 {
                let items = unsafe {
                    Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                        list.items,
                        list.len as usize,
                    ))
                };
                for item in items.iter() {
                    free_ffi_dog_fields(item);
                }
            }
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn dogpatch_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { CString::from_raw(s) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
