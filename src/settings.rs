use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LedgerError, Result};

/// Overrides the settings directory (used by tests and portable setups).
pub const CONFIG_DIR_ENV: &str = "PLAYLEDGER_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// chrono format string for every displayed timestamp.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_color")]
    pub color: bool,
    /// Rows per page in the interactive browser.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_date_format() -> String {
    "%b %-d, %Y %H:%M".to_string()
}

fn default_color() -> bool {
    true
}

fn default_page_size() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            color: default_color(),
            page_size: default_page_size(),
        }
    }
}

fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("playledger")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        parse_settings(&content)
    } else {
        Settings::default()
    }
}

/// Corrupt files fall back to defaults, and so does an unusable date format.
fn parse_settings(content: &str) -> Settings {
    let mut settings: Settings = serde_json::from_str(content).unwrap_or_default();
    if let Err(e) = validate_date_format(&settings.date_format) {
        warn!("{e}, using the default");
        settings.date_format = default_date_format();
    }
    settings.page_size = settings.page_size.max(1);
    settings
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Reject format strings chrono cannot render, so a bad value never reaches
/// the display code.
pub fn validate_date_format(fmt: &str) -> Result<()> {
    use chrono::format::{Item, StrftimeItems};
    if fmt.is_empty() || StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(LedgerError::Settings(format!("invalid date format: {fmt}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            date_format: "%Y-%m-%d".to_string(),
            color: false,
            page_size: 50,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.date_format, "%b %-d, %Y %H:%M");
        assert!(s.color);
        assert_eq!(s.page_size, 20);
    }

    #[test]
    fn test_missing_fields_merge_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"color": false}"#).unwrap();
        assert!(!s.color);
        assert_eq!(s.page_size, 20);
        assert_eq!(s.date_format, default_date_format());
    }

    #[test]
    fn test_hand_edited_bad_values_fall_back() {
        let s = parse_settings(r#"{"date_format": "%Q", "color": false, "page_size": 0}"#);
        assert_eq!(s.date_format, default_date_format());
        assert!(!s.color);
        assert_eq!(s.page_size, 1);
        assert_eq!(parse_settings("not json"), Settings::default());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("%Y-%m-%d").is_ok());
        assert!(validate_date_format("%b %-d, %Y %H:%M").is_ok());
        assert!(validate_date_format("%Q").is_err());
        assert!(validate_date_format("").is_err());
    }
}
