//! Desktop backend configuration loaded from build-time generated JSON.

use basket_core::config::BackendConfig;

/// Parse the build-provisioned JSON embedded into the binary.
///
/// These values are safe-to-ship public endpoints/keys. If parsing fails this
/// logs a warning and returns an empty config.
pub fn parse_bootstrap_config(raw: &str) -> BackendConfig {
    serde_json::from_str::<BackendConfig>(raw)
        .map(BackendConfig::normalized)
        .unwrap_or_else(|error| {
            tracing::warn!("Failed to parse desktop bootstrap config: {}", error);
            BackendConfig::default()
        })
}

/// Runtime environment first, then values baked in at build time.
pub fn load_backend_config() -> BackendConfig {
    let embedded = include_str!(concat!(env!("OUT_DIR"), "/desktop-bootstrap.json"));
    BackendConfig::from_env().with_fallback(parse_bootstrap_config(embedded))
}
