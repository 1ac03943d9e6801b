use anyhow::{Context, Result};
use memo_core::{MemoRepository, PostgrestStore, SqliteStore};
use std::path::Path;
use tracing::debug;

use crate::app_config::{AppConfig, SUPABASE_KEY_ENV, SUPABASE_URL_ENV};
use crate::profile::Backend;

/// Build a repository over the store the configuration points at
pub async fn open_repository(config: &AppConfig) -> Result<MemoRepository> {
    match config.backend {
        Backend::Sqlite => {
            let path = Path::new(&config.db_path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory {:?}", parent))?;
            }

            let store = SqliteStore::open(path)
                .await
                .with_context(|| format!("Failed to open local database at {:?}", path))?;
            debug!(db_path = %config.db_path, "Using sqlite backend");

            Ok(MemoRepository::new(store))
        }
        Backend::Supabase => {
            let url = config.supabase_url.as_deref().with_context(|| {
                format!(
                    "Supabase backend needs `supabase.url` in the profile or {}",
                    SUPABASE_URL_ENV
                )
            })?;
            let key = config.supabase_key.as_deref().with_context(|| {
                format!(
                    "Supabase backend needs `supabase.anon_key` in the profile or {}",
                    SUPABASE_KEY_ENV
                )
            })?;
            debug!(url, "Using supabase backend");

            Ok(MemoRepository::new(PostgrestStore::new(url, key)))
        }
    }
}
