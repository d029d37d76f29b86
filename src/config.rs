// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are stored as YAML next to the working directory. A missing or
//! unreadable file falls back to defaults.

use crate::io::serialization::{export_config_yaml, import_config_yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "roi_annotator.yaml";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter string understood by `env_logger`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("saved_images")
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the annotation repository
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory last used to open media
    #[serde(default)]
    pub last_media_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            last_media_dir: None,
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults.
    ///
    /// Runs before logging is initialized, so problems are returned as a
    /// warning message for the caller to log.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match import_config_yaml(path) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("Ignoring config {}: {:#}", path.display(), e)),
            ),
        }
    }

    pub fn save(&self, path: &Path) {
        match export_config_yaml(self, path) {
            Ok(()) => log::debug!("Saved configuration to {}", path.display()),
            Err(e) => log::warn!("Failed to save configuration: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let (config, warning) = AppConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, AppConfig::default());
        assert!(warning.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "log_level: debug\n").unwrap();

        let (config, warning) = AppConfig::load_or_default(&path);
        assert!(warning.is_none());
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.output_dir, PathBuf::from("saved_images"));
    }

    #[test]
    fn test_invalid_file_warns_and_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "log_level: [oops").unwrap();

        let (config, warning) = AppConfig::load_or_default(&path);
        assert_eq!(config, AppConfig::default());
        assert!(warning.is_some());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = AppConfig {
            last_media_dir: Some(PathBuf::from("/data/videos")),
            ..AppConfig::default()
        };
        config.save(&path);
        assert_eq!(AppConfig::load_or_default(&path).0, config);
    }
}
