//! shopreview-server: HTTP API for shop listings and reviews
//!
//! Route handlers validate input, check out one pooled connection per
//! request, call the repositories in [`db::repos`], and answer with the
//! uniform success/failure envelope from [`http::response`].

pub mod alert;
pub mod db;
pub mod http;
pub mod models;

pub use db::repos::DbError;
pub use http::{run_server, ApiError, ServerConfig, ServerError};
