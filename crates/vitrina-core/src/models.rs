//! Domain models for Vitrina.

pub mod category;
pub mod product;
pub mod shared_link;
