//! CLI error types and exit codes.

use realmadmin_core::error::{AuthError, ConfigError, ConnectError, RealmAdminError, VaultError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, input, I/O
    pub const GENERAL_ERROR: i32 = 1;
    /// Authentication or directory connection failure
    pub const CONNECTION_FAILURE: i32 = 2;
    /// Settings file passphrase wrong, missing, or file corrupt
    pub const VAULT_FAILURE: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    Input(String),

    /// Authentication failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Directory connection failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Settings file could not be opened with the passphrase
    #[error("Settings error: {0}")]
    Passphrase(String),

    /// Settings file I/O or encryption failure
    #[error("Settings error: {0}")]
    Vault(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err.to_string())
    }
}

impl From<ConnectError> for CliError {
    fn from(err: ConnectError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<VaultError> for CliError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::CorruptOrWrongPassphrase | VaultError::PassphraseRequired => {
                Self::Passphrase(err.to_string())
            }
            VaultError::Io(_) | VaultError::Encryption(_) | VaultError::NoHomeDirectory => {
                Self::Vault(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RealmAdminError> for CliError {
    fn from(err: RealmAdminError) -> Self {
        match err {
            RealmAdminError::Auth(e) => e.into(),
            RealmAdminError::Connect(e) => e.into(),
            RealmAdminError::Vault(e) => e.into(),
            RealmAdminError::Config(e) => e.into(),
        }
    }
}

impl CliError {
    /// Returns the exit code for this error.
    ///
    /// - 1: General error (configuration, input, I/O, settings file I/O)
    /// - 2: Authentication or connection failure
    /// - 3: Wrong or missing passphrase, or a corrupt settings file
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Auth(_) | Self::Connection(_) => exit_codes::CONNECTION_FAILURE,
            Self::Passphrase(_) => exit_codes::VAULT_FAILURE,
            Self::Config(_) | Self::Input(_) | Self::Vault(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
