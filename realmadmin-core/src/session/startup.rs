//! Co-located directory startup mode
//!
//! When the directory server runs alongside the tool, the realm and the bind
//! identity come from the server's own environment map instead of an
//! operator login.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectError, ConnectResult};
use crate::models::DEFAULT_LDAP_PORT;

/// Environment key holding the realm
pub const ENV_REALM: &str = "kdc.primary.realm";
/// Environment key holding the bind DN
pub const ENV_PRINCIPAL: &str = "java.naming.security.principal";
/// Environment key holding the bind password
pub const ENV_CREDENTIALS: &str = "java.naming.security.credentials";

/// Host used when the startup configuration names none
pub const DEFAULT_STARTUP_HOST: &str = "localhost";

/// Where a co-located directory listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Host name (defaults to `localhost`)
    #[serde(default = "default_host")]
    pub host: String,
    /// LDAP port
    pub ldap_port: u16,
    /// LDAP over TLS
    #[serde(default)]
    pub use_ldaps: bool,
}

fn default_host() -> String {
    DEFAULT_STARTUP_HOST.to_string()
}

impl StartupConfig {
    /// Creates a configuration for `localhost:ldap_port`
    #[must_use]
    pub fn new(ldap_port: u16) -> Self {
        Self {
            host: default_host(),
            ldap_port,
            use_ldaps: false,
        }
    }

    /// Sets the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Enables or disables LDAPS
    #[must_use]
    pub const fn with_ldaps(mut self, use_ldaps: bool) -> Self {
        self.use_ldaps = use_ldaps;
        self
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LDAP_PORT)
    }
}

/// Looks up a required environment key
///
/// # Errors
///
/// Returns `ConnectError::MissingEnv` naming the key if it is absent
pub fn require_env<'a>(env: &'a HashMap<String, String>, key: &str) -> ConnectResult<&'a str> {
    env.get(key)
        .map(String::as_str)
        .ok_or_else(|| ConnectError::MissingEnv(key.to_string()))
}

/// Parses `KEY=VALUE` pairs into an environment map
///
/// # Errors
///
/// Returns `ConnectError::InvalidInfo` for a pair without `=`
pub fn parse_env_pairs<I, S>(pairs: I) -> ConnectResult<HashMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|pair| {
            let pair = pair.as_ref();
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| ConnectError::InvalidInfo(format!("'{pair}' is not KEY=VALUE")))
        })
        .collect()
}
