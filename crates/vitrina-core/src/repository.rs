//! Repository trait definitions for the document-store collaborator.
//!
//! All repository operations are async and map one-to-one onto store
//! round trips. Store failures surface as [`VitrinaError::Database`]
//! and are never retried here.
//!
//! [`VitrinaError::Database`]: crate::error::VitrinaError::Database

use uuid::Uuid;

use crate::error::VitrinaResult;
use crate::models::{
    category::{Category, CategoryLevel, CreateCategory, UpdateCategory},
    product::{CreateProduct, Product},
    shared_link::{CreateSharedLink, SharedLink},
};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(&self, input: CreateCategory)
    -> impl Future<Output = VitrinaResult<Category>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VitrinaResult<Category>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = VitrinaResult<Category>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = VitrinaResult<()>> + Send;
    /// All categories, oldest first.
    fn list(&self) -> impl Future<Output = VitrinaResult<Vec<Category>>> + Send;
    /// Direct children of `parent_id`.
    fn get_children(
        &self,
        parent_id: Uuid,
    ) -> impl Future<Output = VitrinaResult<Vec<Category>>> + Send;
    /// Refresh the denormalized `parent_name` on every direct child of
    /// `parent_id`. Returns the number of records touched.
    fn set_parent_name_for_children(
        &self,
        parent_id: Uuid,
        parent_name: &str,
    ) -> impl Future<Output = VitrinaResult<u64>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = VitrinaResult<Product>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VitrinaResult<Product>> + Send;
    /// Count products placed at `level` whose id field equals
    /// `category_id` OR whose name field equals `category_name`.
    ///
    /// The name branch is a compatibility shim for records written before
    /// categories were referenced by id. A product satisfying both
    /// branches is counted once.
    fn count_matching(
        &self,
        level: CategoryLevel,
        category_id: Uuid,
        category_name: &str,
    ) -> impl Future<Output = VitrinaResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

pub trait SharedLinkRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSharedLink,
    ) -> impl Future<Output = VitrinaResult<SharedLink>> + Send;
    fn get_by_token(&self, token: &str) -> impl Future<Output = VitrinaResult<SharedLink>> + Send;
    /// All links issued for a module, newest first.
    fn list_by_type(
        &self,
        link_type: &str,
    ) -> impl Future<Output = VitrinaResult<Vec<SharedLink>>> + Send;
    /// Atomically add one to `usage_count` of the link holding `token`.
    /// Must not be implemented as read-modify-write.
    fn increment_usage(&self, token: &str) -> impl Future<Output = VitrinaResult<()>> + Send;
}
