//! Callback-based client for the dogs API.
//!
//! # Design
//! `DogPatchClient` holds a base URL, an injected [`Transport`] and an
//! optional [`ResponseQueue`], none of which change after construction. Each
//! request captures everything it needs in its completion handler, so
//! concurrent requests share no mutable state.
//!
//! A request is split the same way a data task is: the client creates the
//! task and hands it back unstarted, the caller resumes it, and the transport
//! reports `(body, response, error)` which [`classify`] folds into a single
//! result.
//!
//! # Soft failures
//! A response with a non-2xx status and no transport error completes with
//! `Ok(None)`: no items and no error. Callers must not read "no error" as
//! "success".

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::queue::ResponseQueue;
use crate::transport::{CompletionHandler, Transport, TransportError};
use crate::types::Dog;

/// Resource path of the dog listing, relative to the base URL.
pub const DOGS_PATH: &str = "dogs";

/// Outcome of fetching a collection.
///
/// - `Ok(Some(items))`: 2xx response whose body decoded.
/// - `Ok(None)`: the request completed without a usable response, most
///   notably with a non-2xx status. No error is synthesized for this case.
/// - `Err(_)`: transport error or decode error.
pub type CollectionResult<D> = Result<Option<Vec<D>>, ApiError>;

/// Outcome of [`DogPatchClient::get_dogs`].
pub type DogsResult = CollectionResult<Dog>;

/// Client for the dogs API over an injected transport.
pub struct DogPatchClient<T> {
    base_url: Url,
    transport: T,
    response_queue: Option<Arc<dyn ResponseQueue>>,
}

impl<T: Transport> DogPatchClient<T> {
    /// Build a client. Performs no I/O.
    ///
    /// # Errors
    /// `InvalidBaseUrl` if `base_url` cannot have paths resolved against it
    /// (for example `mailto:` or `data:` URLs).
    pub fn new(
        base_url: Url,
        transport: T,
        response_queue: Option<Arc<dyn ResponseQueue>>,
    ) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.into()));
        }
        Ok(Self {
            base_url,
            transport,
            response_queue,
        })
    }

    /// Parse `base_url` and build a client.
    ///
    /// # Errors
    /// `InvalidBaseUrl` if the string is empty, relative or otherwise not a
    /// usable absolute URL.
    pub fn from_base_str(
        base_url: &str,
        transport: T,
        response_queue: Option<Arc<dyn ResponseQueue>>,
    ) -> Result<Self, ApiError> {
        let url = Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        Self::new(url, transport, response_queue)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn response_queue(&self) -> Option<&Arc<dyn ResponseQueue>> {
        self.response_queue.as_ref()
    }

    /// Resolve `path` against the base URL as a relative reference.
    ///
    /// A base without a trailing slash loses its last segment:
    /// `https://h/api/v1` + `dogs` is `https://h/api/dogs`.
    ///
    /// # Errors
    /// `UrlJoin` if `path` is not a valid relative reference.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|source| ApiError::UrlJoin {
            path: path.to_string(),
            source,
        })
    }

    /// Create an unstarted task that fetches the dog listing.
    ///
    /// `completion` runs exactly once after the returned task is resumed,
    /// on the response queue if one was configured.
    ///
    /// # Errors
    /// Propagates `UrlJoin` from [`Self::endpoint_url`].
    pub fn get_dogs<F>(&self, completion: F) -> Result<T::Task, ApiError>
    where
        F: FnOnce(DogsResult) + Send + 'static,
    {
        self.fetch_collection(DOGS_PATH, completion)
    }

    /// Create an unstarted GET task for a JSON array resource at `path`.
    ///
    /// # Errors
    /// Propagates `UrlJoin` from [`Self::endpoint_url`].
    pub fn fetch_collection<D, F>(&self, path: &str, completion: F) -> Result<T::Task, ApiError>
    where
        D: DeserializeOwned + Send + 'static,
        F: FnOnce(CollectionResult<D>) + Send + 'static,
    {
        let url = self.endpoint_url(path)?;
        debug!(%url, "creating GET task");

        let queue = self.response_queue.clone();
        let handler: CompletionHandler = Box::new(move |body, response, error| {
            let result = classify::<D>(body, response, error);
            match queue {
                Some(queue) => queue.dispatch(Box::new(move || completion(result))),
                None => completion(result),
            }
        });

        Ok(self.transport.data_task(url, handler))
    }
}

impl<T: fmt::Debug> fmt::Debug for DogPatchClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DogPatchClient")
            .field("base_url", &self.base_url.as_str())
            .field("transport", &self.transport)
            .field("has_response_queue", &self.response_queue.is_some())
            .finish()
    }
}

/// Fold a transport completion into a single result.
///
/// Precedence: a transport error wins regardless of status or body. Then a
/// missing response, a non-2xx status or a missing body complete with
/// `Ok(None)`. Only then is the body decoded.
pub fn classify<D: DeserializeOwned>(
    body: Option<Vec<u8>>,
    response: Option<HttpResponse>,
    error: Option<TransportError>,
) -> CollectionResult<D> {
    if let Some(error) = error {
        warn!(%error, "transport reported an error");
        return Err(ApiError::Transport(error));
    }

    let Some(response) = response else {
        warn!("transport completed without response metadata");
        return Ok(None);
    };
    if !response.is_success() {
        warn!(
            status = response.status,
            url = %response.url,
            "non-success status, completing without items or error"
        );
        return Ok(None);
    }
    let Some(body) = body else {
        warn!(url = %response.url, "success status but no body");
        return Ok(None);
    };

    match serde_json::from_slice::<Vec<D>>(&body) {
        Ok(items) => {
            debug!(url = %response.url, count = items.len(), "decoded collection");
            Ok(Some(items))
        }
        Err(err) => {
            warn!(url = %response.url, error = %err, "response body failed to decode");
            Err(ApiError::Decode(err))
        }
    }
}
