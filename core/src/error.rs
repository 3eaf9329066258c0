//! Error types for the dogs API client.
//!
//! # Design
//! Only two kinds of failure ever reach a completion handler: the transport's
//! own error, passed through untouched, and the decoder's native error. A
//! non-2xx status is deliberately NOT an error here (see
//! [`crate::client::DogsResult`]). The remaining variants are raised
//! synchronously while building a request.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors produced by `DogPatchClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL is empty, relative, or cannot have paths joined onto it.
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),

    /// The resource path could not be resolved against the base URL.
    #[error("cannot resolve {path:?} against the base URL: {source}")]
    UrlJoin {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The transport failed before producing a response.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The response body did not match the expected schema.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The transport's original error, if this is a transport failure.
    pub fn transport_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ApiError::Transport(err) => Some(&**err),
            _ => None,
        }
    }
}
