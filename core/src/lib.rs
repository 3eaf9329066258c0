//! Callback-based API client core for the DogPatch service.
//!
//! # Overview
//! [`DogPatchClient`] resolves endpoint URLs against a base URL, creates GET
//! tasks through an injected [`Transport`], and classifies each completion
//! into a single [`DogsResult`] delivered on an optional [`ResponseQueue`].
//!
//! # Design
//! - No global networking stack: the transport is a constructor argument.
//! - Tasks come back unstarted; the caller decides when to `resume`.
//! - The completion handler fires once per resumed task. A non-2xx status
//!   without a transport error yields `Ok(None)`, not an error.
//! - The `tokio` feature lets a `tokio::runtime::Handle` serve as the
//!   response queue. Its tests (`tests/tokio_queue.rs`) only build with
//!   `cargo test --features tokio`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod queue;
pub mod transport;
pub mod types;

pub use client::{classify, CollectionResult, DogPatchClient, DogsResult, DOGS_PATH};
pub use error::ApiError;
pub use http::HttpResponse;
pub use queue::{Job, ResponseQueue, SerialQueue};
pub use transport::{Cancelled, CompletionHandler, DataTask, Transport, TransportError};
pub use types::Dog;
