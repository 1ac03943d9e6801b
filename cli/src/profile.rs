use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE: &str = "default";

/// Where memos are stored
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local SQLite file
    #[default]
    Sqlite,
    /// `memos` table of a Supabase project
    Supabase,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SupabaseProfile {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub backend: Backend,
    pub db_path: Option<String>,
    pub default_category: Option<String>,
    #[serde(default)]
    pub supabase: SupabaseProfile,
}

impl Profile {
    pub fn from_path(profile: &Path) -> anyhow::Result<Option<Self>> {
        if !profile.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(profile).context("Failed to read profile file")?;

        let profile: Self = toml::from_str(&contents).context("Failed to deserialize profile")?;

        Ok(Some(profile))
    }
}

/// Get the XDG config directory, respecting XDG_CONFIG_HOME
fn get_config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("memo")
    } else {
        directories::ProjectDirs::from("dev", "memo", "memo")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get the XDG data directory, respecting XDG_DATA_HOME
fn get_data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("memo")
    } else {
        directories::ProjectDirs::from("dev", "memo", "memo")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get path to a profile's config file
pub fn get_profile_config_path(profile_name: &str) -> PathBuf {
    get_config_dir()
        .join("profiles")
        .join(format!("{}.toml", profile_name))
}

/// Get path to a profile's default database
pub fn get_profile_db_path(profile_name: &str) -> PathBuf {
    get_data_dir()
        .join("profiles")
        .join(profile_name)
        .join("memos.db")
}

/// Resolve `--profile-path`: a value that looks like a file path is used as is,
/// anything else names a profile in the config directory
pub fn get_profile_path(arg_profile: &Option<String>) -> PathBuf {
    match arg_profile {
        Some(arg) if looks_like_path(arg) => PathBuf::from(arg),
        Some(profile_name) => get_profile_config_path(profile_name),
        None => get_profile_config_path(DEFAULT_PROFILE),
    }
}

/// Profile name of a profile file (its stem)
pub fn profile_name(profile_path: &Path) -> String {
    profile_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_PROFILE)
        .to_string()
}

fn looks_like_path(arg: &str) -> bool {
    arg.ends_with(".toml") || arg.contains(std::path::MAIN_SEPARATOR) || arg.contains('/')
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_profile_is_none() {
        let dir = TempDir::new().unwrap();

        assert!(Profile::from_path(&dir.path().join("nope.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_supabase_profile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote.toml");
        std::fs::write(
            &path,
            r#"
backend = "supabase"
default_category = "inbox"

[supabase]
url = "https://abc.supabase.co"
anon_key = "public-anon-key"
"#,
        )
        .unwrap();

        let profile = Profile::from_path(&path).unwrap().unwrap();

        assert_eq!(profile.backend, Backend::Supabase);
        assert_eq!(profile.default_category.as_deref(), Some("inbox"));
        assert_eq!(
            profile.supabase.url.as_deref(),
            Some("https://abc.supabase.co")
        );
        assert!(profile.db_path.is_none());
    }

    #[test]
    fn test_empty_profile_defaults_to_sqlite() {
        let profile: Profile = toml::from_str("").unwrap();

        assert_eq!(profile, Profile::default());
        assert_eq!(profile.backend, Backend::Sqlite);
    }

    #[test]
    fn test_profile_path_resolution() {
        let explicit = get_profile_path(&Some("/tmp/work.toml".to_string()));
        assert_eq!(explicit, PathBuf::from("/tmp/work.toml"));
        assert_eq!(profile_name(&explicit), "work");

        let named = get_profile_path(&Some("work".to_string()));
        assert!(named.ends_with("profiles/work.toml"));
    }
}
