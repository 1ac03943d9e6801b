use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{MemoRow, MemoWrite};
use crate::query::{Column, Filter, Query};

/// Query-builder access to the `memos` table.
///
/// Every call is one request against the backing store. Implementations own
/// ids and timestamps: `insert` assigns `id`, `created_at` and `updated_at`,
/// `update` refreshes `updated_at`.
#[async_trait]
pub trait MemoStore: Send + Sync {
    /// Rows matching all filters, in the requested order
    async fn select(&self, query: &Query) -> StoreResult<Vec<MemoRow>>;

    /// Exactly one row, or [`StoreError::NoRows`](crate::StoreError::NoRows)
    async fn select_single(&self, query: &Query) -> StoreResult<MemoRow>;

    /// A single text column of each matching row
    async fn select_column(&self, column: Column, query: &Query) -> StoreResult<Vec<String>>;

    /// Insert a row and return it as stored
    async fn insert(&self, row: &MemoWrite) -> StoreResult<MemoRow>;

    /// Replace the writable columns of the single row matching `filter`
    async fn update(&self, row: &MemoWrite, filter: &Filter) -> StoreResult<MemoRow>;

    /// Delete every row matching `filter`
    async fn delete(&self, filter: &Filter) -> StoreResult<()>;
}
