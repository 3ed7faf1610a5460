//! `realmadmin` Core Library
//!
//! Connection and credential management for a directory administration
//! tool: operator authentication, bound administrative sessions with
//! observable state, and an encrypted local settings file.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection descriptors, gateway configs, settings bundle, principals
//! - [`auth`] - Challenge-driven authentication (`AuthenticationOrchestrator`)
//! - [`session`] - `SessionConnector` and `ConnectionState`
//! - [`directory`] - Directory client seam and the `ldap3` connector
//! - [`vault`] - `CredentialVault` for the encrypted settings file
//! - [`config`] - TOML configuration
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod session;
pub mod tracing;
pub mod vault;

pub use auth::{
    AuthenticationOrchestrator, AuthenticationProvider, Challenge, ChallengeHandler,
    ChallengeResponse, DirectoryBindProvider, DirectoryBindProviderFactory, ProviderFactory,
    ProviderOptions,
};
pub use config::{AdminConfig, ConfigManager};
pub use directory::{
    BindParameters, DirectoryClient, DirectoryConnector, LdapDirectoryClient,
    LdapDirectoryConnector,
};
pub use error::{
    AuthError, AuthResult, ConfigError, ConfigResult, ConnectError, ConnectResult,
    RealmAdminError, VaultError, VaultResult,
};
pub use models::{
    AdminToolSettings, ApplicationPolicy, AuthorizationProfile, ConnectionInfo,
    ConnectionInfoModifier, Principal, SmsConfig, SmtpConfig,
};
pub use session::{
    ConnectionEvent, ConnectionObserver, ConnectionSnapshot, ConnectionState, SessionConnector,
    StartupConfig,
};
pub use vault::{CredentialVault, EncryptionStrength};
