//! `#[repr(C)]` types for the FFI boundary, plus the host-driven transport.
//!
//! # Design
//! Each result type mirrors a core type but uses C-compatible
//! representations: `*mut c_char` instead of `String`, raw pointers instead
//! of `Vec`. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.
//!
//! The C host is the transport. `HostTransport` only parks the completion
//! handler inside an `FfiDataTask`; the host reads the task URL, performs the
//! GET however it likes, and reports back through `dogpatch_task_complete`.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use dogpatch_core::{
    ApiError, Cancelled, CompletionHandler, DataTask, Dog, DogPatchClient, DogsResult,
    HttpResponse, Transport, TransportError,
};
use url::Url;

/// Opaque handle to a `DogPatchClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiDogPatchClient {
    pub(crate) inner: DogPatchClient<HostTransport>,
}

// ---------------------------------------------------------------------------
// Host-driven transport
// ---------------------------------------------------------------------------

/// Transport whose network I/O is performed by the C host.
#[derive(Debug, Default)]
pub struct HostTransport;

impl Transport for HostTransport {
    type Task = FfiDataTask;

    fn data_task(&self, url: Url, completion: CompletionHandler) -> FfiDataTask {
        FfiDataTask {
            url,
            completion: Mutex::new(Some(completion)),
            resumed: AtomicBool::new(false),
        }
    }
}

/// Opaque handle to a pending GET. Freed with `dogpatch_task_free`.
pub struct FfiDataTask {
    url: Url,
    completion: Mutex<Option<CompletionHandler>>,
    resumed: AtomicBool,
}

impl FfiDataTask {
    pub(crate) fn is_resumed(&self) -> bool {
        self.resumed.load(Ordering::SeqCst)
    }

    /// Hand the outcome to the client. Returns false if the task already
    /// completed or was cancelled.
    pub(crate) fn complete(
        &self,
        body: Option<Vec<u8>>,
        response: Option<HttpResponse>,
        error: Option<TransportError>,
    ) -> bool {
        let handler = match self.completion.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match handler {
            Some(handler) => {
                handler(body, response, error);
                true
            }
            None => false,
        }
    }
}

impl DataTask for FfiDataTask {
    fn url(&self) -> &Url {
        &self.url
    }

    fn resume(&self) {
        self.resumed.store(true, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.complete(None, None, Some(Box::new(Cancelled)));
    }
}

/// Transport failure described by the host as a message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HostTransportError(pub String);

/// Raw `user_data` pointer carried to the completion callback.
pub(crate) struct UserData(*mut c_void);

// SAFETY: the pointer is never dereferenced on the Rust side; it is handed
// back verbatim to the host's callback, which owns its thread-safety.
unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

/// Called once per task with an owned result; free it with
/// `dogpatch_free_result`.
pub type FfiDogsCallback = extern "C" fn(result: *mut FfiDogsResult, user_data: *mut c_void);

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// HTTP response metadata and body as reported by the host.
///
/// A null `body` means the host received no body at all, which is distinct
/// from an empty one (`body` non-null, `body_len` 0). The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiDogsResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    Decode = 2,
    InvalidUrl = 3,
}

/// A single dog listing exposed to C.
#[repr(C)]
pub struct FfiDog {
    pub id: *mut c_char,
    pub seller_id: *mut c_char,
    pub about: *mut c_char,
    pub birthday: *mut c_char,
    pub breed: *mut c_char,
    pub breeder_rating: f64,
    pub cost: f64,
    pub created: *mut c_char,
    pub image_url: *mut c_char,
    pub name: *mut c_char,
}

/// A list of dog listings exposed to C.
#[repr(C)]
pub struct FfiDogList {
    pub items: *mut FfiDog,
    pub len: u32,
}

/// Result envelope delivered to `FfiDogsCallback`.
///
/// - Success: `error_code` is `Ok` and `dogs` points to the list.
/// - Non-2xx status: `error_code` is `Ok` and `dogs` is null. The client
///   reports no error for HTTP status failures; check `dogs` before use.
/// - Failure: `error_code` names the category, `error_message` is a
///   human-readable C string, `dogs` is null.
#[repr(C)]
pub struct FfiDogsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub dogs: *mut FfiDogList,
}

/// Convert to an owned C string, dropping interior NULs.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiDog {
    fn from_core(dog: Dog) -> Self {
        FfiDog {
            id: to_c_string(dog.id.to_string()),
            seller_id: to_c_string(dog.seller_id.to_string()),
            about: to_c_string(dog.about),
            birthday: to_c_string(dog.birthday),
            breed: to_c_string(dog.breed),
            breeder_rating: dog.breeder_rating,
            cost: dog.cost,
            created: to_c_string(dog.created),
            image_url: to_c_string(String::from(dog.image_url)),
            name: to_c_string(dog.name),
        }
    }
}

impl FfiDogsResult {
    /// Convert a core `DogsResult` into a heap-allocated envelope.
    pub(crate) fn from_core(result: DogsResult) -> *mut Self {
        match result {
            Ok(Some(dogs)) => Self::ok_dogs(dogs),
            Ok(None) => Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), std::ptr::null_mut()),
            Err(err) => Self::from_error(&err),
        }
    }

    fn ok_dogs(dogs: Vec<Dog>) -> *mut Self {
        let len = u32::try_from(dogs.len()).unwrap_or(u32::MAX);
        let ffi_dogs: Vec<FfiDog> = dogs
            .into_iter()
            .take(len as usize)
            .map(FfiDog::from_core)
            .collect();

        let items = if ffi_dogs.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_dogs.into_boxed_slice()).cast::<FfiDog>()
        };

        let list = Box::into_raw(Box::new(FfiDogList { items, len }));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), list)
    }

    /// Build an error result from an `ApiError`.
    fn from_error(err: &ApiError) -> *mut Self {
        let code = match err {
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Decode(_) => FfiErrorCode::Decode,
            ApiError::InvalidBaseUrl(_) | ApiError::UrlJoin { .. } => FfiErrorCode::InvalidUrl,
        };
        Self::boxed(code, to_c_string(err.to_string()), std::ptr::null_mut())
    }

    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, dogs: *mut FfiDogList) -> *mut Self {
        Box::into_raw(Box::new(FfiDogsResult {
            error_code,
            error_message,
            dogs,
        }))
    }
}

/// Free the C-string fields of an `FfiDog` (but not the struct itself).
pub(crate) fn free_ffi_dog_fields(dog: &FfiDog) {
    for field in [
        dog.id,
        dog.seller_id,
        dog.about,
        dog.birthday,
        dog.breed,
        dog.created,
        dog.image_url,
        dog.name,
    ] {
        if !field.is_null() {
            drop(unsafe { CString::from_raw(field) });
        }
    }
}
