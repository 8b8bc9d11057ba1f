//! Error types for the Vitrina admin core.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum VitrinaError {
    #[error("Category {id} cannot be placed under {parent_id}: it would become its own ancestor")]
    Cycle { id: Uuid, parent_id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VitrinaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type VitrinaResult<T> = Result<T, VitrinaError>;
