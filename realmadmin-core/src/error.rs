//! Error types for `realmadmin`
//!
//! Each subsystem has its own error enum and result alias. `RealmAdminError`
//! wraps them for callers (such as the CLI) that handle every kind at once.

use thiserror::Error;

/// Errors raised while authenticating an operator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider raised a challenge kind the orchestrator cannot answer
    #[error("Unsupported authentication challenge: {0}")]
    UnsupportedChallenge(String),

    /// The provider rejected the supplied credentials or policy
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider asked for a one-time passcode but none was supplied
    #[error("A one-time passcode is required")]
    MissingPasscode,

    /// The provider could not be constructed or failed internally
    #[error("Authentication provider error: {0}")]
    Provider(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors raised while opening a directory session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The directory rejected the bind
    #[error("Bind as '{bind_dn}' to {url} failed: {reason}")]
    Bind {
        /// Connection URL that was used
        url: String,
        /// Bind DN that was used
        bind_dn: String,
        /// Reason reported by the directory client
        reason: String,
    },

    /// The directory could not be reached
    #[error("Directory unreachable: {0}")]
    Unreachable(String),

    /// A required startup environment key is missing
    #[error("Missing startup environment key: {0}")]
    MissingEnv(String),

    /// The connection descriptor is not usable
    #[error("Invalid connection info: {0}")]
    InvalidInfo(String),
}

/// Result type for session operations
pub type ConnectResult<T> = std::result::Result<T, ConnectError>;

/// Errors raised by the credential vault
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Settings file could not be read or written
    #[error("I/O error: {0}")]
    Io(String),

    /// Decryption or post-decryption parsing failed
    #[error("Settings file is corrupt or the passphrase is wrong")]
    CorruptOrWrongPassphrase,

    /// No vault passphrase was set on the settings bundle
    #[error("A vault passphrase is required")]
    PassphraseRequired,

    /// Encryption primitives failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// The default location could not be resolved
    #[error("Cannot determine home directory")]
    NoHomeDirectory,
}

/// Result type for vault operations
pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// A value failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The platform configuration directory is unknown
    #[error("Cannot determine configuration directory")]
    NoConfigDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Umbrella error for the whole crate
#[derive(Debug, Error)]
pub enum RealmAdminError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Session error
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Vault error
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}
