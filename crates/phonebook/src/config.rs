//! Configuration management for phonebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::audit::AuditLog;
use crate::contact::ContactField;
use crate::error::{Error, Result};
use crate::import::ImportPolicy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "phonebook";

/// Default audit log file name.
const AUDIT_LOG_FILE_NAME: &str = "phonebook.log";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PHONEBOOK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/phonebook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Audit log configuration.
    pub audit: AuditConfig,
    /// Display configuration.
    pub display: DisplayConfig,
    /// Bulk import configuration.
    pub import: ImportConfig,
}

/// Audit-log-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Write the audit trail to disk. When disabled, entries are kept in
    /// memory for the current session only.
    pub enabled: bool,
    /// Path to the audit log file.
    /// Defaults to `~/.local/share/phonebook/phonebook.log`
    pub log_path: Option<PathBuf>,
}

/// Display-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Field used to order the contact list.
    pub sort_by: ContactField,
}

/// Import-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// What to do with a row that fails validation.
    pub policy: ImportPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: None, // Will be resolved to default at runtime
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading `config_path` instead of
    /// the default file when given.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("PHONEBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self
            .audit
            .log_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: "audit.log_path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the audit log path, resolving defaults if not set.
    #[must_use]
    pub fn audit_log_path(&self) -> PathBuf {
        self.audit
            .log_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(AUDIT_LOG_FILE_NAME))
    }

    /// Build the audit log described by this configuration.
    #[must_use]
    pub fn audit_log(&self) -> AuditLog {
        if self.audit.enabled {
            AuditLog::file(self.audit_log_path())
        } else {
            AuditLog::in_memory()
        }
    }
}
