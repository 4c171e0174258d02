//! Configuration loader for Quill.
//!
//! Reads `config.toml` from the data directory (`~/.quill/` in production)
//! and deserializes it into [`QuillConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use quill_types::config::QuillConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "QUILL_DATA_DIR";

/// Resolve the data directory: `QUILL_DATA_DIR`, else `~/.quill`.
pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quill")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`QuillConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> QuillConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return QuillConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return QuillConfig::default();
        }
    };

    match toml::from_str::<QuillConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            QuillConfig::default()
        }
    }
}
