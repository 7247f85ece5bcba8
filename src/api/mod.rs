//! Request client for the analysis backend.
//!
//! Every call is a fresh unauthenticated GET; there is no retrying and no
//! caching. Failures are normalized into [`FetchError`].

mod client;
mod error;
mod request;

pub use client::{ApiClient, Fetcher};
pub use error::FetchError;
pub use request::{ApiRequest, Endpoint, QueryParams};
