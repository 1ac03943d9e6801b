//! Named memo operations over a [`MemoStore`].
//!
//! Reads favor availability: a failing store is logged and the read returns an
//! empty result. Writes favor correctness: the failure is logged and returned
//! to the caller.

use std::sync::Arc;

use tracing::error;

use crate::error::StoreResult;
use crate::models::{Memo, MemoFormData, MemoStats, MemoWrite};
use crate::query::{Column, Filter, Query};
use crate::store::MemoStore;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone)]
pub struct MemoRepository {
    store: Arc<dyn MemoStore>,
}

impl MemoRepository {
    pub fn new<S: MemoStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_shared(store: Arc<dyn MemoStore>) -> Self {
        Self { store }
    }

    /// All memos, newest first. Empty when the store fails.
    pub async fn get_all(&self) -> Vec<Memo> {
        self.read_list("get_all", Query::new().newest_first())
            .await
    }

    pub async fn add(&self, form: &MemoFormData) -> StoreResult<Memo> {
        self.store
            .insert(&MemoWrite::from(form))
            .await
            .map(Memo::from)
            .inspect_err(|e| error!(operation = "add", error = %e, "Failed to add memo"))
    }

    /// Replace the writable fields of memo `id`
    pub async fn update(&self, id: &str, form: &MemoFormData) -> StoreResult<Memo> {
        self.store
            .update(&MemoWrite::from(form), &Filter::eq(Column::Id, id))
            .await
            .map(Memo::from)
            .inspect_err(|e| error!(operation = "update", id, error = %e, "Failed to update memo"))
    }

    /// Delete memo `id`. Deleting an unknown id is not an error.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.store
            .delete(&Filter::eq(Column::Id, id))
            .await
            .inspect_err(|e| error!(operation = "remove", id, error = %e, "Failed to delete memo"))
    }

    /// Look a memo up, telling "no such memo" (`Ok(None)`) apart from store failures
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Memo>> {
        let query = Query::new().filter(Filter::eq(Column::Id, id));
        match self.store.select_single(&query).await {
            Ok(row) => Ok(Some(Memo::from(row))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `None` both when the memo does not exist and when the store fails
    pub async fn get_by_id(&self, id: &str) -> Option<Memo> {
        match self.find_by_id(id).await {
            Ok(memo) => memo,
            Err(e) => {
                error!(operation = "get_by_id", id, error = %e, "Failed to get memo by id");
                None
            }
        }
    }

    /// Memos in `category`, newest first. [`ALL_CATEGORIES`] disables the filter.
    pub async fn get_by_category(&self, category: &str) -> Vec<Memo> {
        if category == ALL_CATEGORIES {
            return self.get_all().await;
        }

        let query = Query::new()
            .filter(Filter::eq(Column::Category, category))
            .newest_first();
        self.read_list("get_by_category", query).await
    }

    /// Memos whose title or content contains `query`, ignoring case.
    /// A blank query returns everything.
    pub async fn search(&self, query: &str) -> Vec<Memo> {
        let needle = query.trim();
        if needle.is_empty() {
            return self.get_all().await;
        }

        let query = Query::new()
            .filter(Filter::any_contains(
                &[Column::Title, Column::Content],
                needle,
            ))
            .newest_first();
        self.read_list("search", query).await
    }

    /// Delete every memo
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.store
            .delete(&Filter::everything())
            .await
            .inspect_err(|e| error!(operation = "clear_all", error = %e, "Failed to clear memos"))
    }

    /// Totals per category. Zeroed when the store fails.
    pub async fn get_stats(&self) -> MemoStats {
        match self
            .store
            .select_column(Column::Category, &Query::new())
            .await
        {
            Ok(categories) => MemoStats::from_categories(categories),
            Err(e) => {
                error!(operation = "get_stats", error = %e, "Failed to get memo stats");
                MemoStats::default()
            }
        }
    }

    async fn read_list(&self, operation: &'static str, query: Query) -> Vec<Memo> {
        match self.store.select(&query).await {
            Ok(rows) => rows.into_iter().map(Memo::from).collect(),
            Err(e) => {
                error!(operation, error = %e, "Failed to load memos");
                vec![]
            }
        }
    }
}
