use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Bootstrap JSON key and the environment variable that provides it.
const BOOTSTRAP_FIELDS: [(&str, &str); 4] = [
    ("supabase_url", "SUPABASE_URL"),
    ("supabase_anon_key", "SUPABASE_ANON_KEY"),
    ("items_table", "BASKET_ITEMS_TABLE"),
    ("categories_table", "BASKET_CATEGORIES_TABLE"),
];

fn main() {
    for (_, var) in BOOTSTRAP_FIELDS {
        println!("cargo:rerun-if-env-changed={var}");
    }

    if let Err(error) = write_bootstrap_config() {
        println!("cargo:warning=failed to generate desktop bootstrap config: {error}");
    }
}

fn write_bootstrap_config() -> io::Result<()> {
    let manifest_dir =
        env::var_os("CARGO_MANIFEST_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
    load_workspace_dotenv(&manifest_dir);

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;

    let fields: Map<String, Value> = BOOTSTRAP_FIELDS
        .iter()
        .map(|(key, var)| {
            let value = env_value(var).map_or(Value::Null, Value::String);
            ((*key).to_string(), value)
        })
        .collect();
    let content = serde_json::to_string_pretty(&fields)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::create_dir_all(&out_dir)?;
    fs::write(out_dir.join("desktop-bootstrap.json"), content)
}

/// `.env` at the workspace root, two levels above this crate.
fn load_workspace_dotenv(manifest_dir: &Path) {
    let path = manifest_dir.join("../../.env");
    if path.is_file() {
        println!("cargo:rerun-if-changed={}", path.display());
        let _ = dotenvy::from_path(path);
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
