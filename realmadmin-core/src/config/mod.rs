//! Tool configuration
//!
//! `AdminConfig` is a TOML file under the platform configuration directory
//! holding logging, vault and directory defaults. It never holds secrets;
//! those live in the encrypted settings file.

mod manager;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{DEFAULT_KRB5_PORT, DEFAULT_LDAP_PORT};
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

pub use manager::{CONFIG_FILE_NAME, ConfigManager};

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Logging options
    pub logging: LoggingSettings,
    /// Settings-file options
    pub vault: VaultSettings,
    /// Directory connection defaults
    pub directory: DirectorySettings,
}

impl AdminConfig {
    /// Checks values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for the first invalid value
    pub fn validate(&self) -> ConfigResult<()> {
        if self.logging.level.parse::<TracingLevel>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if self.directory.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "connect_timeout_secs must be positive".to_string(),
            ));
        }
        if self.directory.default_ldap_port == 0 || self.directory.default_krb5_port == 0 {
            return Err(ConfigError::Validation("ports must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Tracing configuration described by the logging section
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let level = self.logging.level.parse().unwrap_or_default();
        let output = self
            .logging
            .file
            .as_ref()
            .map_or(TracingOutput::Stderr, |file| {
                TracingOutput::File(expand_path(file))
            });
        TracingConfig::new().with_level(level).with_output(output)
    }
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Log file; stderr when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: TracingLevel::Warn.to_string(),
            file: None,
        }
    }
}

/// Vault section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    /// Settings file location; `~` is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl VaultSettings {
    /// Settings file location with `~` expanded
    #[must_use]
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(expand_path)
    }
}

/// Directory section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// Connect and bind timeout in seconds
    pub connect_timeout_secs: u64,
    /// LDAP port used when none is given
    pub default_ldap_port: u16,
    /// Kerberos port used when none is given
    pub default_krb5_port: u16,
    /// Whether LDAPS is used when not specified
    pub default_use_ldaps: bool,
}

impl DirectorySettings {
    /// Connect timeout as a `Duration`
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            default_ldap_port: DEFAULT_LDAP_PORT,
            default_krb5_port: DEFAULT_KRB5_PORT,
            default_use_ldaps: false,
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
