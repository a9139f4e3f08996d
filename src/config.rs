//! User configuration handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_LATENCY, DEFAULT_STALE_TIME};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: Option<String>,
    pub api_latency_ms: Option<u64>,
    pub search_debounce_ms: Option<u64>,
    pub stale_time_secs: Option<u64>,
    pub fixtures_dir: Option<PathBuf>,
}

impl UiConfig {
    #[must_use]
    pub fn api_latency(&self) -> Duration {
        self.api_latency_ms
            .map_or(DEFAULT_LATENCY, Duration::from_millis)
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        self.search_debounce_ms
            .map_or(DEFAULT_SEARCH_DEBOUNCE, Duration::from_millis)
    }

    #[must_use]
    pub fn stale_time(&self) -> Duration {
        self.stale_time_secs
            .map_or(DEFAULT_STALE_TIME, Duration::from_secs)
    }
}

/// Load UI configuration from the user's config directory.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_ui_config() -> anyhow::Result<Option<UiConfig>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_ui_config_from(&path)
}

/// Load UI configuration from an explicit path; a missing file is `None`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_ui_config_from(path: &Path) -> anyhow::Result<Option<UiConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(Some(config))
}

/// Save UI configuration to the user's config directory.
///
/// # Errors
///
/// Returns an error if the config directory cannot be created or the file cannot be written.
pub fn save_ui_config(config: &UiConfig) -> anyhow::Result<()> {
    let Some(path) = config_path() else {
        return Ok(());
    };
    save_ui_config_to(config, &path)
}

/// Save UI configuration to an explicit path, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_ui_config_to(config: &UiConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".config")
    } else {
        return None;
    };

    Some(base.join("codereview-ui").join("ui.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_ui_config_from(&dir.path().join("ui.json")).unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ui.json");
        let config = UiConfig {
            theme: Some("nord".to_string()),
            api_latency_ms: Some(50),
            ..UiConfig::default()
        };
        save_ui_config_to(&config, &path).unwrap();
        assert_eq!(load_ui_config_from(&path).unwrap(), Some(config));
    }

    #[test]
    fn unset_fields_fall_back_to_defaults() {
        let config: UiConfig = serde_json::from_str(r#"{"theme":"default-light"}"#).unwrap();
        assert_eq!(config.api_latency(), Duration::from_millis(500));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.stale_time(), Duration::from_secs(300));
        assert_eq!(config.fixtures_dir, None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_ui_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
