use std::path::Path;

use serde::Serialize;

use crate::profile::{get_profile_db_path, profile_name, Backend, Profile};

pub const DEFAULT_CATEGORY: &str = "general";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Serialize)]
pub struct AppConfig {
    pub profile_path: String,
    pub profile_exists: bool,
    pub backend: Backend,
    pub db_path: String,
    pub supabase_url: Option<String>,
    #[serde(skip)]
    pub supabase_key: Option<String>,
    pub supabase_key_set: bool,
    pub default_category: String,
}

impl AppConfig {
    pub fn from_profile(profile_path: &Path, profile: Option<&Profile>) -> Self {
        Self::resolve(profile_path, profile, |name| std::env::var(name).ok())
    }

    /// Profile values, with Supabase credentials overridable from the environment
    fn resolve(
        profile_path: &Path,
        profile: Option<&Profile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let db_path = profile
            .and_then(|p| p.db_path.clone())
            .unwrap_or_else(|| {
                get_profile_db_path(&profile_name(profile_path))
                    .to_string_lossy()
                    .into_owned()
            });

        let supabase_url = env(SUPABASE_URL_ENV)
            .or_else(|| profile.and_then(|p| p.supabase.url.clone()));
        let supabase_key = env(SUPABASE_KEY_ENV)
            .or_else(|| profile.and_then(|p| p.supabase.anon_key.clone()));

        AppConfig {
            profile_path: profile_path.to_string_lossy().into_owned(),
            profile_exists: profile.is_some(),
            backend: profile.map(|p| p.backend).unwrap_or_default(),
            db_path,
            supabase_url,
            supabase_key_set: supabase_key.is_some(),
            supabase_key,
            default_category: profile
                .and_then(|p| p.default_category.clone())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        }
    }
}
