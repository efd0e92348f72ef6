//! Jobdock API service.
//!
//! Exposes the library surface used by the binary in `main.rs` and by the
//! integration tests under `tests/`.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;

/// API path prefix for all job routes.
pub const API_PREFIX: &str = "/api/v1";
