//! Messaging gateway configurations
//!
//! Default SMS and SMTP gateway parameters stored alongside the connection
//! defaults in the credential vault.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::connection_info::empty_secret;

/// SMS gateway account used to deliver one-time passcodes
#[derive(Clone)]
pub struct SmsConfig {
    /// Gateway account name
    pub account_name: String,
    /// Gateway user name
    pub username: String,
    /// Gateway password
    pub password: SecretString,
    /// Transport endpoint URL
    pub transport_url: String,
}

impl SmsConfig {
    /// Creates an empty SMS configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_name: String::new(),
            username: String::new(),
            password: empty_secret(),
            transport_url: String::new(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SmsConfig {
    fn eq(&self, other: &Self) -> bool {
        self.account_name == other.account_name
            && self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
            && self.transport_url == other.transport_url
    }
}

impl Eq for SmsConfig {}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_name", &self.account_name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("transport_url", &self.transport_url)
            .finish()
    }
}

/// SMTP relay used for notification mail
///
/// `username` and `password` are only meaningful when `authenticate` is set.
#[derive(Clone, Default)]
pub struct SmtpConfig {
    /// Relay host
    pub host: String,
    /// Sender address
    pub from: String,
    /// Default subject line
    pub subject: String,
    /// Whether the relay requires authentication
    pub authenticate: bool,
    /// Relay user name
    pub username: Option<String>,
    /// Relay password
    pub password: Option<SecretString>,
}

impl SmtpConfig {
    /// Creates an unauthenticated SMTP configuration
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            from: from.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Enables authentication with the given account
    #[must_use]
    pub fn with_authentication(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.authenticate = true;
        self.username = Some(username.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Disables authentication and drops any stored account
    pub fn clear_authentication(&mut self) {
        self.authenticate = false;
        self.username = None;
        self.password = None;
    }
}

impl PartialEq for SmtpConfig {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
            && self.from == other.from
            && self.subject == other.subject
            && self.authenticate == other.authenticate
            && self.username == other.username
            && self.password.as_ref().map(ExposeSecret::expose_secret)
                == other.password.as_ref().map(ExposeSecret::expose_secret)
    }
}

impl Eq for SmtpConfig {}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("from", &self.from)
            .field("subject", &self.subject)
            .field("authenticate", &self.authenticate)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
