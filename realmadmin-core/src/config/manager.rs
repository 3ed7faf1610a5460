//! Loading and saving the configuration file

use std::fs;
use std::path::{Path, PathBuf};

use super::AdminConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Reads and writes `AdminConfig` in a configuration directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses `$XDG_CONFIG_HOME/realmadmin` (or the platform equivalent)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if the platform directory is unknown
    pub fn new() -> ConfigResult<Self> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join("realmadmin")))
    }

    /// Uses an explicit configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Full path of the configuration file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration, or defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io`, `ConfigError::Parse` or
    /// `ConfigError::Validation`
    pub fn load(&self) -> ConfigResult<AdminConfig> {
        let path = self.config_path();
        let _span = crate::trace_operation!(span_names::CONFIG_LOAD, path = %path.display())
            .entered();

        if !path.exists() {
            tracing::debug!("No configuration file, using defaults");
            return Ok(AdminConfig::default());
        }

        let text = fs::read_to_string(&path)?;
        let config: AdminConfig = toml::from_str(&text)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation`, `ConfigError::Serialize` or
    /// `ConfigError::Io`
    pub fn save(&self, config: &AdminConfig) -> ConfigResult<()> {
        config.validate()?;
        let text =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::create_dir_all(&self.config_dir)?;
        fs::write(self.config_path(), text)?;
        tracing::debug!(path = %self.config_path().display(), "Configuration saved");
        Ok(())
    }
}
