//! REST API client module for the marketplace backend.
//!
//! Every outbound call goes through [`ApiClient`], which attaches the
//! bearer token from the [`Session`](crate::auth::Session), recovers from an
//! expired access token with a single refresh-and-retry, and reports
//! terminal failures to a [`Notifier`] before handing them back to the
//! caller as an [`ApiError`].
//!
//! Responses use the `{ success, data, error }` envelope, decoded once here
//! so services and the shell work with typed data.

pub mod client;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use envelope::{api_call, ApiOutcome, Envelope, DEFAULT_ERROR_MESSAGE};
pub use error::{ApiError, ErrorDetail, ServerError};
pub use notify::{Notice, Notifier, QuietNotifier, TracingNotifier};
pub use request::{ApiRequest, FormPart, FormValue, RequestBody};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
