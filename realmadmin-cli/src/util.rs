//! Shared utility functions used across command modules.

use std::path::{Path, PathBuf};

use realmadmin_core::config::{AdminConfig, ConfigManager};
use realmadmin_core::vault::CredentialVault;
use secrecy::SecretString;

use crate::error::CliError;

/// Everything a command needs besides its own arguments
pub struct Context {
    /// Loaded configuration
    pub config: AdminConfig,
    /// Settings file access
    pub vault: CredentialVault,
    /// Passphrase given on the command line or in the environment
    pub passphrase: Option<String>,
}

impl Context {
    /// Loads configuration and resolves the settings file location
    ///
    /// The `--vault` option wins over `vault.path` in the configuration,
    /// which wins over `~/.realmadmin-settings`.
    pub fn load(
        config_dir: Option<&Path>,
        vault_path: Option<&Path>,
        passphrase: Option<String>,
    ) -> Result<Self, CliError> {
        let config = create_config_manager(config_dir)?.load()?;
        let vault = match vault_path
            .map(Path::to_path_buf)
            .or_else(|| config.vault.resolved_path())
        {
            Some(path) => CredentialVault::with_path(path),
            None => CredentialVault::new()?,
        };
        Ok(Self {
            config,
            vault,
            passphrase,
        })
    }

    /// Settings file passphrase from the command line, environment or a prompt
    pub fn passphrase(&self) -> Result<SecretString, CliError> {
        read_secret("Settings passphrase: ", self.passphrase.as_deref())
    }
}

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(PathBuf::from(path))),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Returns `preset` as a secret, or prompts for one without echo
pub fn read_secret(prompt: &str, preset: Option<&str>) -> Result<SecretString, CliError> {
    if let Some(value) = preset {
        return Ok(SecretString::from(value.to_string()));
    }
    eprint!("{prompt}");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| CliError::Input(format!("Failed to read {}: {e}", prompt.trim_end_matches([':', ' ']))))
}

/// Masks a secret for display
pub fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "********" }
}
