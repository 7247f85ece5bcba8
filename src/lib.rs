//! Resonance: browse precomputed comment analysis served by the Resonance
//! backend.
//!
//! The backend has already scored every comment for sentiment, quality and
//! topic category; this crate only requests, paginates and reshapes those
//! results. Each page of the dashboard is a [`views::View`] state machine
//! driven by a [`runtime::Runtime`].

pub mod api;
pub mod charts;
pub mod config;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod state;
pub mod views;

pub use api::{ApiClient, ApiRequest, Endpoint, FetchError, Fetcher, QueryParams};
pub use config::{Config, Settings};
pub use runtime::Runtime;
pub use state::{FetchState, Generation, Slot, Ticket};
