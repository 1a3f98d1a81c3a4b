use async_trait::async_trait;
use serde::Serialize;

use crate::product::Product;
use crate::user::User;

/// Persistence faults surfaced to callers. NotFound is an explicit variant
/// so both paths must be handled; it is never signalled by panicking.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// One window of an id-descending product listing, plus the paging
/// metadata the list UI needs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub content: Vec<Product>,
    pub number: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl ProductPage {
    /// ceil(total / size); a request past the last page still gets a
    /// consistent count alongside empty content.
    pub fn pages_for(total_elements: u64, size: u32) -> u32 {
        (total_elements.div_ceil(size as u64)) as u32
    }
}

/// Repository contract for product records. Implementations own all
/// persisted state; callers hold a reference only. `filter` is a
/// pre-trimmed search term matched case-insensitively anywhere in the
/// name, with LIKE metacharacters treated as literal data. All listings
/// are ordered id-descending.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_page(
        &self,
        filter: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<ProductPage, StoreError>;

    /// Every matching record in one sequence; never capped. Used for export.
    async fn find_all(&self, filter: Option<&str>) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Persist a new record and return it with the assigned id.
    async fn insert(&self, product: &Product) -> Result<Product, StoreError>;

    /// Full replace of the mutable fields of the record carrying
    /// `product.id`. Ok(None) when no such record exists.
    async fn update(&self, product: &Product) -> Result<Option<Product>, StoreError>;

    /// Remove by id, returning the number of rows affected.
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}

/// Repository contract for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new account. A duplicate email is a `Conflict`.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
