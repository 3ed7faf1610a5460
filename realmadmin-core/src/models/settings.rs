//! Administration tool settings bundle
//!
//! The bundle persisted by the credential vault. The vault passphrase lives
//! here only in memory; it is never written into the payload.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::connection_info::{ConnectionInfo, empty_secret};
use super::gateway::{SmsConfig, SmtpConfig};

/// Built-in default for the passcode-prompt flag
pub const DEFAULT_PROMPT_FOR_PASSCODE: bool = false;

/// Defaults used by the administration tool
#[derive(Clone)]
pub struct AdminToolSettings {
    connection: ConnectionInfo,
    sms: SmsConfig,
    smtp: SmtpConfig,
    admin_tool_password: SecretString,
    settings_passphrase: Option<SecretString>,
    prompt_for_passcode: bool,
    presentation_base_url: String,
}

impl AdminToolSettings {
    /// Creates a settings bundle with empty defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection: ConnectionInfo::default(),
            sms: SmsConfig::new(),
            smtp: SmtpConfig::default(),
            admin_tool_password: empty_secret(),
            settings_passphrase: None,
            prompt_for_passcode: DEFAULT_PROMPT_FOR_PASSCODE,
            presentation_base_url: String::new(),
        }
    }

    /// Default connection parameters
    #[must_use]
    pub const fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    /// Sets the default connection parameters
    pub fn set_connection(&mut self, connection: ConnectionInfo) {
        self.connection = connection;
    }

    /// Default SMS gateway
    #[must_use]
    pub const fn sms(&self) -> &SmsConfig {
        &self.sms
    }

    /// Sets the default SMS gateway
    pub fn set_sms(&mut self, sms: SmsConfig) {
        self.sms = sms;
    }

    /// Default SMTP relay
    #[must_use]
    pub const fn smtp(&self) -> &SmtpConfig {
        &self.smtp
    }

    /// Sets the default SMTP relay
    pub fn set_smtp(&mut self, smtp: SmtpConfig) {
        self.smtp = smtp;
    }

    /// Password protecting the administration tool itself
    #[must_use]
    pub const fn admin_tool_password(&self) -> &SecretString {
        &self.admin_tool_password
    }

    /// Sets the administration tool password
    pub fn set_admin_tool_password(&mut self, password: SecretString) {
        self.admin_tool_password = password;
    }

    /// Vault passphrase held for this session
    #[must_use]
    pub const fn settings_passphrase(&self) -> Option<&SecretString> {
        self.settings_passphrase.as_ref()
    }

    /// Sets the vault passphrase for this session
    pub fn set_settings_passphrase(&mut self, passphrase: SecretString) {
        self.settings_passphrase = Some(passphrase);
    }

    /// Whether operators are prompted for a one-time passcode
    #[must_use]
    pub const fn prompt_for_passcode(&self) -> bool {
        self.prompt_for_passcode
    }

    /// Sets the passcode-prompt flag
    pub const fn set_prompt_for_passcode(&mut self, prompt: bool) {
        self.prompt_for_passcode = prompt;
    }

    /// Base URL of the presentation (self-service) front end
    #[must_use]
    pub fn presentation_base_url(&self) -> &str {
        &self.presentation_base_url
    }

    /// Sets the presentation base URL
    pub fn set_presentation_base_url(&mut self, url: impl Into<String>) {
        self.presentation_base_url = url.into();
    }
}

impl Default for AdminToolSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares persisted fields only; the vault passphrase is ignored
impl PartialEq for AdminToolSettings {
    fn eq(&self, other: &Self) -> bool {
        self.connection == other.connection
            && self.sms == other.sms
            && self.smtp == other.smtp
            && self.admin_tool_password.expose_secret() == other.admin_tool_password.expose_secret()
            && self.prompt_for_passcode == other.prompt_for_passcode
            && self.presentation_base_url == other.presentation_base_url
    }
}

impl Eq for AdminToolSettings {}

impl fmt::Debug for AdminToolSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminToolSettings")
            .field("connection", &self.connection)
            .field("sms", &self.sms)
            .field("smtp", &self.smtp)
            .field("admin_tool_password", &"[REDACTED]")
            .field(
                "settings_passphrase",
                &self.settings_passphrase.as_ref().map(|_| "[REDACTED]"),
            )
            .field("prompt_for_passcode", &self.prompt_for_passcode)
            .field("presentation_base_url", &self.presentation_base_url)
            .finish()
    }
}
