//! Connection descriptor and its builder
//!
//! `ConnectionInfo` is the immutable value handed to the authentication and
//! session layers. `ConnectionInfoModifier` is the mutable form used by
//! editors and by settings deserialization.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, ConfigResult};

/// Default LDAP port of the directory server
pub const DEFAULT_LDAP_PORT: u16 = 10389;

/// Default Kerberos KDC port
pub const DEFAULT_KRB5_PORT: u16 = 88;

/// Principal name that binds as the directory system administrator
pub const SUPER_USER: &str = "admin";

/// Cached regex for realm names: dot-separated labels
static REALM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("REALM_REGEX is a valid regex pattern")
});

/// Converts a dotted realm name into a distinguished-name base
///
/// `example.com` becomes `dc=example,dc=com`. Labels are lowercased and
/// empty labels are skipped, so an empty realm yields an empty base.
#[must_use]
pub fn realm_to_base_dn(realm: &str) -> String {
    realm
        .split('.')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| format!("dc={}", label.to_lowercase()))
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

/// Immutable connection parameters for one directory deployment
#[derive(Clone)]
pub struct ConnectionInfo {
    host: String,
    ldap_port: u16,
    krb5_port: u16,
    use_ldaps: bool,
    realm: String,
    principal: String,
    credentials: SecretString,
    passcode: Option<SecretString>,
}

impl ConnectionInfo {
    /// Directory host name or address
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// LDAP port
    #[must_use]
    pub const fn ldap_port(&self) -> u16 {
        self.ldap_port
    }

    /// Kerberos KDC port
    #[must_use]
    pub const fn krb5_port(&self) -> u16 {
        self.krb5_port
    }

    /// Whether the connection uses LDAP over TLS
    #[must_use]
    pub const fn use_ldaps(&self) -> bool {
        self.use_ldaps
    }

    /// Realm name, for example `example.com`
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Operator principal name
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Operator password
    #[must_use]
    pub const fn credentials(&self) -> &SecretString {
        &self.credentials
    }

    /// One-time passcode, if one was entered
    #[must_use]
    pub const fn passcode(&self) -> Option<&SecretString> {
        self.passcode.as_ref()
    }

    /// Distinguished-name base derived from the realm
    ///
    /// Always recomputed from `realm`.
    #[must_use]
    pub fn ldap_realm_base(&self) -> String {
        realm_to_base_dn(&self.realm)
    }

    /// Connection URL of the form `ldap[s]://host:port/base`
    #[must_use]
    pub fn ldap_url(&self) -> String {
        let scheme = if self.use_ldaps { "ldaps" } else { "ldap" };
        format!(
            "{scheme}://{}:{}/{}",
            self.host,
            self.ldap_port,
            self.ldap_realm_base()
        )
    }

    /// Returns true if this descriptor names the directory super-user
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        self.principal == SUPER_USER
    }

    /// Checks the descriptor for values that can never produce a session
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation("host is empty".to_string()));
        }
        if self.ldap_port == 0 {
            return Err(ConfigError::Validation("LDAP port is zero".to_string()));
        }
        if self.krb5_port == 0 {
            return Err(ConfigError::Validation("Kerberos port is zero".to_string()));
        }
        if !REALM_REGEX.is_match(&self.realm) {
            return Err(ConfigError::Validation(format!(
                "realm '{}' is not a dotted domain name",
                self.realm
            )));
        }
        if self.principal.trim().is_empty() {
            return Err(ConfigError::Validation("principal is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        ConnectionInfoModifier::new().info()
    }
}

impl PartialEq for ConnectionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
            && self.ldap_port == other.ldap_port
            && self.krb5_port == other.krb5_port
            && self.use_ldaps == other.use_ldaps
            && self.realm == other.realm
            && self.principal == other.principal
            && self.credentials.expose_secret() == other.credentials.expose_secret()
            && self.passcode.as_ref().map(ExposeSecret::expose_secret)
                == other.passcode.as_ref().map(ExposeSecret::expose_secret)
    }
}

impl Eq for ConnectionInfo {}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("host", &self.host)
            .field("ldap_port", &self.ldap_port)
            .field("krb5_port", &self.krb5_port)
            .field("use_ldaps", &self.use_ldaps)
            .field("realm", &self.realm)
            .field("principal", &self.principal)
            .field("credentials", &"[REDACTED]")
            .field("passcode", &self.passcode.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Mutable builder for `ConnectionInfo`
#[derive(Clone)]
pub struct ConnectionInfoModifier {
    /// Directory host
    pub host: String,
    /// LDAP port
    pub ldap_port: u16,
    /// Kerberos KDC port
    pub krb5_port: u16,
    /// LDAP over TLS
    pub use_ldaps: bool,
    /// Realm name
    pub realm: String,
    /// Operator principal
    pub principal: String,
    /// Operator password
    pub credentials: SecretString,
    /// One-time passcode
    pub passcode: Option<SecretString>,
}

impl ConnectionInfoModifier {
    /// Creates an empty builder with default ports
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: String::new(),
            ldap_port: DEFAULT_LDAP_PORT,
            krb5_port: DEFAULT_KRB5_PORT,
            use_ldaps: false,
            realm: String::new(),
            principal: String::new(),
            credentials: empty_secret(),
            passcode: None,
        }
    }

    /// Sets the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the LDAP port
    #[must_use]
    pub const fn with_ldap_port(mut self, port: u16) -> Self {
        self.ldap_port = port;
        self
    }

    /// Sets the Kerberos port
    #[must_use]
    pub const fn with_krb5_port(mut self, port: u16) -> Self {
        self.krb5_port = port;
        self
    }

    /// Enables or disables LDAPS
    #[must_use]
    pub const fn with_ldaps(mut self, use_ldaps: bool) -> Self {
        self.use_ldaps = use_ldaps;
        self
    }

    /// Sets the realm
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Sets the principal
    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }

    /// Sets the password
    #[must_use]
    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = SecretString::from(credentials.into());
        self
    }

    /// Sets the one-time passcode
    #[must_use]
    pub fn with_passcode(mut self, passcode: impl Into<String>) -> Self {
        self.passcode = Some(SecretString::from(passcode.into()));
        self
    }

    /// Produces an immutable snapshot of the current values
    #[must_use]
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            host: self.host.clone(),
            ldap_port: self.ldap_port,
            krb5_port: self.krb5_port,
            use_ldaps: self.use_ldaps,
            realm: self.realm.clone(),
            principal: self.principal.clone(),
            credentials: self.credentials.clone(),
            passcode: self.passcode.clone(),
        }
    }
}

impl Default for ConnectionInfoModifier {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ConnectionInfo> for ConnectionInfoModifier {
    fn from(info: &ConnectionInfo) -> Self {
        Self {
            host: info.host.clone(),
            ldap_port: info.ldap_port,
            krb5_port: info.krb5_port,
            use_ldaps: info.use_ldaps,
            realm: info.realm.clone(),
            principal: info.principal.clone(),
            credentials: info.credentials.clone(),
            passcode: info.passcode.clone(),
        }
    }
}

impl fmt::Debug for ConnectionInfoModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.info(), f)
    }
}
