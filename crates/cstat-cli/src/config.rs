//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Duration;
use cstat_core::ExtractorConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reopen gap (hours) beyond which a pending session is discarded.
    pub max_reopen_gap_hours: i64,
    /// Session duration cap in minutes.
    pub max_session_minutes: f64,
    /// Maximum number of device files accepted per run.
    pub max_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_reopen_gap_hours: 24,
            max_session_minutes: 1440.0,
            max_files: 6,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CSTAT_*)
        figment = figment.merge(Env::prefixed("CSTAT_"));

        figment.extract()
    }

    /// Realism bounds for session extraction.
    #[must_use]
    pub fn extractor(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_reopen_gap: Duration::hours(self.max_reopen_gap_hours),
            max_session_minutes: self.max_session_minutes,
        }
    }
}

/// Returns the platform-specific config directory for cstat.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cstat"))
}
