//! Catalog persistence
//!
//! Handlers talk to [`CatalogStore`]; [`PgCatalogStore`] is the PostgreSQL
//! implementation. Multi-row writes (a toy and its category links) are
//! atomic: either every row is written or none is.

mod postgres;

pub use postgres::PgCatalogStore;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::Category;
use crate::features::toys::models::{NewToy, Toy, ToySummary};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All toys ordered by name, with their categories
    async fn list_toys(&self) -> Result<Vec<Toy>>;

    async fn get_toy(&self, id: i32) -> Result<Option<Toy>>;

    /// Insert a toy and link it to the named categories.
    ///
    /// Fails with `NotFound` if any category name does not exist.
    async fn create_toy(&self, toy: NewToy) -> Result<Toy>;

    /// Overwrite a toy's fields and replace its category set with exactly
    /// `toy.categories`. `toy.image: None` keeps the current image.
    async fn update_toy(&self, id: i32, toy: NewToy) -> Result<Toy>;

    /// Remove a toy together with its category links
    async fn delete_toy(&self, id: i32) -> Result<()>;

    /// All categories ordered by name
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn get_category(&self, id: i32) -> Result<Option<Category>>;

    /// Case-insensitive lookup by name
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Fails with `Conflict` if the name is taken (case-insensitive)
    async fn create_category(&self, name: &str, description: &str) -> Result<Category>;

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<Category>;

    /// Callers check for linked toys first; a category that still has toys
    /// fails with `Conflict`.
    async fn delete_category(&self, id: i32) -> Result<()>;

    /// Toys linked to a category, ordered by name
    async fn toys_in_category(&self, category_id: i32) -> Result<Vec<ToySummary>>;

    async fn count_toys(&self) -> Result<i64>;

    async fn count_categories(&self) -> Result<i64>;
}
