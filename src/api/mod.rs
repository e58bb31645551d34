//! HTTP API.
//!
//! Exposes the journal, analysis and community search as JSON endpoints
//! under `/api/`. Every request passes the caller-resolution middleware,
//! which maps a bearer token to its account or treats the caller as guest.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
