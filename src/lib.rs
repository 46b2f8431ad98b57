//! Client library for an AI code assistant API: explain a piece of code,
//! ask for a refactoring, or generate tests for it.
//!
//! The interesting part is the request lifecycle: [`api::ApiClient`] issues
//! single-attempt HTTP calls with a fixed timeout and uniform error mapping,
//! deduplicating identical in-flight requests through a TTL cache, while
//! [`action`] keeps independent loading/error/result state per action kind
//! and discards superseded completions.

pub mod action;
pub mod api;
pub mod config;
pub mod paths;
pub mod session;
