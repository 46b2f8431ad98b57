//! Client side of the code assistant API: transport, dedup cache, typed
//! endpoints, and the error taxonomy shared by all of them.

pub mod cache;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, ServerError};
