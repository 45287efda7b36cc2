//! Domain models with validation at construction
//!
//! Request input is parsed into these types before any data access.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod id;
pub mod messages;
pub mod merge;
pub mod pagination;
pub mod reaction;
pub mod review_order;
pub mod shop_filter;

pub use validation::ValidationError;
pub use id::parse_id;
pub use merge::{merge_duplicates, Mergeable, Merged};
pub use pagination::{Pagination, PaginationParams};
pub use reaction::Reaction;
pub use review_order::ReviewOrder;
pub use shop_filter::ShopFilter;
