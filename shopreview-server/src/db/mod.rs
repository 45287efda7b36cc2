//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Repositories borrow one connection (`&mut PgConnection`); a pooled
//!   connection or an open transaction both deref to it
//! - Soft-deleted rows are filtered in SQL, never in Rust
//! - Rely on DB constraints for toggles - no check-then-insert
//! - Not found is `None` or an empty `Vec`, never an error

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
