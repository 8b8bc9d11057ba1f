//! SurrealDB repository implementations.

mod category;
mod product;
mod shared_link;

pub use category::SurrealCategoryRepository;
pub use product::SurrealProductRepository;
pub use shared_link::SurrealSharedLinkRepository;

use surrealdb_types::SurrealValue;

/// Row struct for `count() ... GROUP ALL` queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}
