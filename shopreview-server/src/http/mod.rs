//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Actor identification from the gateway header
//! - Error reporting for unhandled failures
//! - Uniform success/failure envelope
//! - Graceful shutdown

pub mod auth;
pub mod error;
pub mod extractors;
pub mod report;
pub mod response;
pub mod routes;
pub mod server;

pub use auth::AuthUser;
pub use error::ApiError;
pub use response::Success;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
