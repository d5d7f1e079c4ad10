//! Ingredient data provider
//!
//! `Ok(vec![])` from [`IngredientSource::list_all_ingredients`] means the
//! backend answered with no records; `Err` means it could not be used. The
//! chat pipeline degrades the latter to an empty snapshot.

pub mod backend;
pub mod model;

pub use backend::{BackendClient, DEFAULT_BACKEND_TIMEOUT};
pub use model::IngredientRecord;

use crate::error::Result;
use async_trait::async_trait;

/// Source of ingredient record snapshots
#[async_trait]
pub trait IngredientSource: Send + Sync {
    /// Every record the backend currently holds
    async fn list_all_ingredients(&self) -> Result<Vec<IngredientRecord>>;

    /// One record by batch identifier; `Ok(None)` when the backend has no such batch
    async fn get_ingredient_by_batch(&self, batch_number: &str) -> Result<Option<IngredientRecord>>;

    /// Cheap reachability check
    async fn ping(&self) -> Result<()>;
}
