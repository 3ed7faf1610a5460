//! Directory client abstraction
//!
//! The session layer never talks to a directory protocol directly. It hands
//! `BindParameters` to a `DirectoryConnector` and keeps the returned
//! `DirectoryClient` handle until disconnect.

mod ldap;

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConnectResult;
use crate::models::ApplicationPolicy;

pub use ldap::{LdapDirectoryClient, LdapDirectoryConnector};

/// Default bind timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a connector needs to open a bound directory session
#[derive(Clone)]
pub struct BindParameters {
    /// `ldap://` or `ldaps://` URL including the realm base as path
    pub url: String,
    /// DN of the entry to bind as
    pub bind_dn: String,
    /// Simple-bind password
    pub password: SecretString,
    /// One-time passcode appended to the password at bind time
    pub passcode: Option<SecretString>,
    /// Search base for administered entries
    pub base_dn: String,
    /// Authorization policy bound to the session, if any
    pub policy: Option<ApplicationPolicy>,
    /// Connect and bind timeout
    pub connect_timeout: Duration,
}

impl fmt::Debug for BindParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindParameters")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("password", &"[REDACTED]")
            .field("passcode", &self.passcode.as_ref().map(|_| "[REDACTED]"))
            .field("base_dn", &self.base_dn)
            .field("policy", &self.policy)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl BindParameters {
    /// Password presented on the wire: the password followed by the passcode
    #[must_use]
    pub fn bind_password(&self) -> SecretString {
        match &self.passcode {
            Some(passcode) => SecretString::from(format!(
                "{}{}",
                self.password.expose_secret(),
                passcode.expose_secret()
            )),
            None => self.password.clone(),
        }
    }
}

/// An open, bound directory session
pub trait DirectoryClient: Send {
    /// Names of the administered entries directly under the search base
    ///
    /// # Errors
    ///
    /// Returns an error if the directory query fails
    fn entries(&mut self) -> ConnectResult<Vec<String>>;

    /// Unbinds and releases the session
    ///
    /// # Errors
    ///
    /// Returns an error if the unbind fails; the handle is unusable either way
    fn close(&mut self) -> ConnectResult<()>;
}

/// Opens directory sessions
pub trait DirectoryConnector: Send + Sync {
    /// Connects and binds with `params`
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Unreachable` if the server cannot be reached and
    /// `ConnectError::Bind` if the bind is rejected
    fn open(&self, params: &BindParameters) -> ConnectResult<Box<dyn DirectoryClient>>;
}

/// Bind DN of the directory super-user
pub const ADMIN_BIND_DN: &str = "uid=admin,ou=system";

/// Bind DN of an ordinary user under a realm base
///
/// The user name is escaped as an attribute value, so `smith, john` cannot
/// split into extra RDNs.
#[must_use]
pub fn user_bind_dn(user_name: &str, base_dn: &str) -> String {
    format!("uid={},ou=Users,{base_dn}", ldap3::dn_escape(user_name))
}

/// Unescaped value of the first RDN: `uid=jdoe,ou=Users,dc=x` -> `jdoe`
///
/// Honors both `\,` and `\2c` escapes, so `uid=smith\2c john,ou=Users`
/// yields `smith, john`. Escaped spaces survive; bare surrounding ones don't.
#[must_use]
pub fn rdn_value(dn: &str) -> String {
    let bytes = dn.as_bytes();
    let mut value = Vec::with_capacity(bytes.len());
    // Bytes up to this length came from escapes and are never trimmed
    let mut kept = 0;
    let mut in_value = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\\' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok());
                if let Some(byte) = hex {
                    value.push(byte);
                    kept = value.len();
                    i += 3;
                    continue;
                }
                if let Some(&next) = bytes.get(i + 1) {
                    value.push(next);
                    kept = value.len();
                    i += 2;
                    continue;
                }
            }
            b',' | b'+' => break,
            b'=' if !in_value => {
                in_value = true;
                value.clear();
                kept = 0;
            }
            b' ' if value.is_empty() => {}
            _ => value.push(c),
        }
        i += 1;
    }
    while value.len() > kept && value.last() == Some(&b' ') {
        value.pop();
    }
    String::from_utf8_lossy(&value).into_owned()
}
