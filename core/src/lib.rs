#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

pub mod db;
pub mod error;
pub mod models;
pub mod postgrest;
pub mod query;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use db::SqliteStore;
pub use error::{StoreError, StoreResult, NO_ROWS_CODE};
pub use models::{Memo, MemoFormData, MemoRow, MemoStats, MemoWrite};
pub use postgrest::PostgrestStore;
pub use query::{Column, Filter, Order, Query, NIL_ID};
pub use repository::{MemoRepository, ALL_CATEGORIES};
pub use store::MemoStore;
