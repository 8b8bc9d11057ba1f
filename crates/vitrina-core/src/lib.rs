//! Vitrina Core — shared domain types, error taxonomy, and the store
//! collaborator traits consumed by the catalog and sharing services.

pub mod clock;
pub mod error;
pub mod models;
pub mod repository;
