//! Backend configuration for client apps.
//!
//! Provides a unified `BackendConfig` used by desktop and CLI to discover the
//! Supabase project and the table names that hold items and categories.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::remote::Collection;
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_ITEMS_TABLE: &str = "items";
pub const DEFAULT_CATEGORIES_TABLE: &str = "categories";

const REALTIME_PROTOCOL_VERSION: &str = "1.0.0";

/// Client configuration as provided by env, profile files, or build scripts.
///
/// These values are safe-to-ship public endpoints/keys. Secret credentials
/// must never be stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub items_table: Option<String>,
    #[serde(default)]
    pub categories_table: Option<String>,
}

impl BackendConfig {
    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `BASKET_ITEMS_TABLE` and
    /// `BASKET_CATEGORIES_TABLE` from the process environment.
    pub fn from_env() -> Self {
        Self {
            supabase_url: std::env::var("SUPABASE_URL").ok(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").ok(),
            items_table: std::env::var("BASKET_ITEMS_TABLE").ok(),
            categories_table: std::env::var("BASKET_CATEGORIES_TABLE").ok(),
        }
        .normalized()
    }

    /// Fill unset fields from `fallback`. Values already set on `self` win.
    #[must_use]
    pub fn with_fallback(self, fallback: Self) -> Self {
        let this = self.normalized();
        let fallback = fallback.normalized();
        Self {
            supabase_url: this.supabase_url.or(fallback.supabase_url),
            supabase_anon_key: this.supabase_anon_key.or(fallback.supabase_anon_key),
            items_table: this.items_table.or(fallback.items_table),
            categories_table: this.categories_table.or(fallback.categories_table),
        }
    }

    /// `true` when neither the URL nor the key is set.
    pub const fn is_empty(&self) -> bool {
        self.supabase_url.is_none() && self.supabase_anon_key.is_none()
    }

    /// Validate and resolve into concrete endpoints.
    pub fn resolve(&self) -> Result<ResolvedBackend> {
        let config = self.clone().normalized();
        let (Some(url), Some(anon_key)) = (config.supabase_url, config.supabase_anon_key) else {
            return Err(Error::Config(
                "Supabase URL and anon key are both required".to_string(),
            ));
        };
        if !is_http_url(&url) {
            return Err(Error::Config(
                "Supabase URL must include http:// or https://".to_string(),
            ));
        }

        Ok(ResolvedBackend {
            base_url: url.trim_end_matches('/').to_string(),
            anon_key,
            items_table: config
                .items_table
                .unwrap_or_else(|| DEFAULT_ITEMS_TABLE.to_string()),
            categories_table: config
                .categories_table
                .unwrap_or_else(|| DEFAULT_CATEGORIES_TABLE.to_string()),
        })
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            supabase_url: normalize_text_option(self.supabase_url),
            supabase_anon_key: normalize_text_option(self.supabase_anon_key),
            items_table: normalize_text_option(self.items_table),
            categories_table: normalize_text_option(self.categories_table),
        }
    }
}

/// Validated backend endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedBackend {
    base_url: String,
    anon_key: String,
    items_table: String,
    categories_table: String,
}

impl std::fmt::Debug for ResolvedBackend {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ResolvedBackend")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("items_table", &self.items_table)
            .field("categories_table", &self.categories_table)
            .finish()
    }
}

impl ResolvedBackend {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url)
    }

    /// Websocket endpoint of the realtime service.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn={REALTIME_PROTOCOL_VERSION}",
            urlencoding::encode(&self.anon_key)
        )
    }

    pub fn table(&self, collection: Collection) -> &str {
        match collection {
            Collection::Items => &self.items_table,
            Collection::Categories => &self.categories_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> BackendConfig {
        BackendConfig {
            supabase_url: Some(url.to_string()),
            supabase_anon_key: Some("anon".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_applies_default_tables() {
        let resolved = config("https://project.supabase.co/").resolve().unwrap();
        assert_eq!(resolved.base_url(), "https://project.supabase.co");
        assert_eq!(resolved.table(Collection::Items), "items");
        assert_eq!(resolved.table(Collection::Categories), "categories");
        assert_eq!(resolved.rest_url(), "https://project.supabase.co/rest/v1");
    }

    #[test]
    fn resolve_rejects_missing_key() {
        let config = BackendConfig {
            supabase_url: Some("https://project.supabase.co".to_string()),
            supabase_anon_key: Some("  ".to_string()),
            ..Default::default()
        };
        let error = config.resolve().unwrap_err();
        assert!(matches!(
            &error,
            Error::Config(message) if message.contains("anon key are both required")
        ));
    }

    #[test]
    fn resolve_rejects_url_without_scheme() {
        assert!(config("project.supabase.co").resolve().is_err());
    }

    #[test]
    fn realtime_url_switches_to_websocket_scheme() {
        let resolved = config("https://project.supabase.co").resolve().unwrap();
        assert_eq!(
            resolved.realtime_url(),
            "wss://project.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = config("http://localhost:54321").resolve().unwrap();
        assert!(local.realtime_url().starts_with("ws://localhost:54321/"));
    }

    #[test]
    fn with_fallback_prefers_explicit_values() {
        let explicit = BackendConfig {
            items_table: Some("groceries".to_string()),
            ..Default::default()
        };
        let merged = explicit.with_fallback(config("https://project.supabase.co"));
        assert_eq!(merged.items_table.as_deref(), Some("groceries"));
        assert_eq!(
            merged.supabase_url.as_deref(),
            Some("https://project.supabase.co")
        );
    }

    #[test]
    fn debug_redacts_anon_key() {
        let resolved = config("https://project.supabase.co").resolve().unwrap();
        let rendered = format!("{resolved:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("\"anon\""));
    }
}
