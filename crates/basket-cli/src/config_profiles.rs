//! Named backend profiles stored in `cli-config.json`.
//!
//! Each profile is a [`BackendConfig`]; unset fields fall back to the
//! environment when the profile is used.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use basket_core::config::BackendConfig;
use basket_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "basket";
const CONFIG_FILE_NAME: &str = "cli-config.json";
const PROFILE_ENV_VAR: &str = "BASKET_PROFILE";
const DEFAULT_PROFILE: &str = "default";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, BackendConfig>,
}

impl Default for CliProfilesConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            active_profile: None,
            profiles: BTreeMap::new(),
        }
    }
}

const fn current_version() -> u32 {
    CONFIG_VERSION
}

pub fn default_config_path() -> Result<PathBuf, String> {
    let dir = dirs::config_dir().ok_or("Failed to resolve the user config directory")?;
    Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    /// A missing file is an empty config.
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(error) => return Err(format!("Failed to read {}: {error}", path.display())),
        };

        serde_json::from_str::<Self>(&raw)
            .map(Self::normalized)
            .map_err(|error| format!("Failed to parse {}: {error}", path.display()))
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("Failed to create {}: {error}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(&self.clone().normalized())
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        fs::write(path, serialized)
            .map_err(|error| format!("Failed to write {}: {error}", path.display()))
    }

    /// Explicit name, then `BASKET_PROFILE`, then the active profile, then
    /// `default`.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(explicit, std::env::var(PROFILE_ENV_VAR).ok())
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<String>) -> String {
        normalize_text_option(explicit.map(str::to_string))
            .or_else(|| normalize_text_option(env))
            .or_else(|| self.active_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    /// Store `update` over `name`. Fields `update` leaves unset keep their
    /// previous value.
    pub fn update_profile(&mut self, name: &str, update: BackendConfig) -> &BackendConfig {
        let profile = self.profiles.entry(name.to_string()).or_default();
        *profile = update.with_fallback(profile.clone());
        profile
    }

    /// Backend settings for `name`, with unset values taken from the
    /// environment.
    pub fn backend_for(&self, name: &str) -> BackendConfig {
        self.profiles
            .get(name)
            .cloned()
            .unwrap_or_default()
            .with_fallback(BackendConfig::from_env())
    }

    fn normalized(self) -> Self {
        Self {
            version: self.version,
            active_profile: normalize_text_option(self.active_profile),
            profiles: self
                .profiles
                .into_iter()
                .map(|(name, profile)| (name, profile.normalized()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn backend(url: Option<&str>, key: Option<&str>) -> BackendConfig {
        BackendConfig {
            supabase_url: url.map(str::to_string),
            supabase_anon_key: key.map(str::to_string),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn saved_profiles_load_back_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            active_profile: Some(" home ".to_string()),
            ..CliProfilesConfig::default()
        };
        config.profiles.insert(
            "home".to_string(),
            BackendConfig {
                supabase_url: Some(" https://project.supabase.co ".to_string()),
                supabase_anon_key: Some(" anon-key ".to_string()),
                items_table: Some("shopping_items".to_string()),
                categories_table: Some("  ".to_string()),
            },
        );

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.active_profile.as_deref(), Some("home"));
        assert_eq!(
            loaded.profiles["home"],
            BackendConfig {
                supabase_url: Some("https://project.supabase.co".to_string()),
                supabase_anon_key: Some("anon-key".to_string()),
                items_table: Some("shopping_items".to_string()),
                categories_table: None,
            }
        );
    }

    #[test]
    fn missing_file_is_an_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliProfilesConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, CliProfilesConfig::default());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(CliProfilesConfig::load_from_path(&path)
            .unwrap_err()
            .starts_with("Failed to parse"));
    }

    #[test]
    fn profile_name_precedence() {
        let config = CliProfilesConfig {
            active_profile: Some("work".to_string()),
            ..CliProfilesConfig::default()
        };
        let env = || Some("env".to_string());
        assert_eq!(config.resolve_profile_name_with_env(Some("home"), env()), "home");
        assert_eq!(config.resolve_profile_name_with_env(Some("  "), env()), "env");
        assert_eq!(config.resolve_profile_name_with_env(None, None), "work");
        assert_eq!(
            CliProfilesConfig::default().resolve_profile_name_with_env(None, Some(" ".to_string())),
            "default"
        );
    }

    #[test]
    fn update_keeps_fields_the_update_leaves_unset() {
        let mut config = CliProfilesConfig::default();
        config.update_profile(
            "default",
            backend(Some("https://old.supabase.co"), Some("old-key")),
        );
        let profile = config.update_profile(
            "default",
            BackendConfig {
                supabase_anon_key: Some(" new-key ".to_string()),
                items_table: Some("groceries".to_string()),
                ..BackendConfig::default()
            },
        );

        assert_eq!(
            profile,
            &BackendConfig {
                supabase_url: Some("https://old.supabase.co".to_string()),
                supabase_anon_key: Some("new-key".to_string()),
                items_table: Some("groceries".to_string()),
                categories_table: None,
            }
        );
    }
}
