//! Application settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::table::PAGE_SIZE_OPTIONS;

/// Application-wide settings, the `[settings]` table of the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,
    /// `dark` or `light`.
    pub theme: String,
    /// Initial rows per page for tables without saved view state.
    pub page_size: usize,
    /// Quiet period before a typed search is applied.
    pub search_debounce_ms: u64,
    /// Where CSV exports are written. Defaults to the download directory.
    pub export_dir: Option<PathBuf>,
    /// Event loop tick interval.
    pub tick_rate_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            theme: "dark".to_string(),
            page_size: 10,
            search_debounce_ms: 1000,
            export_dir: None,
            tick_rate_ms: 100,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !PAGE_SIZE_OPTIONS.contains(&self.page_size) {
            return Err(ConfigError::ValidationError(format!(
                "page_size must be one of {:?}, got {}",
                PAGE_SIZE_OPTIONS, self.page_size
            )));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_rate_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// The configured export directory, else the platform download
    /// directory, else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.search_debounce(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_table_fills_defaults() {
        let s: Settings = toml::from_str("page_size = 20").unwrap();
        assert_eq!(s.page_size, 20);
        assert_eq!(s.theme, "dark");
        assert_eq!(s.tick_rate_ms, 100);
    }

    #[test]
    fn test_odd_page_size_rejected() {
        let s = Settings {
            page_size: 15,
            ..Settings::default()
        };
        assert!(s.validate().unwrap_err().to_string().contains("page_size"));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let s = Settings {
            tick_rate_ms: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_explicit_export_dir_wins() {
        let s = Settings {
            export_dir: Some(PathBuf::from("/tmp/exports")),
            ..Settings::default()
        };
        assert_eq!(s.export_dir(), PathBuf::from("/tmp/exports"));
    }
}
