//! Mapping between `AdminToolSettings` and flat property entries

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::models::{AdminToolSettings, ConnectionInfoModifier, SmsConfig, SmtpConfig};

/// Stable property keys of the settings file
pub mod keys {
    /// Directory host
    pub const CONN_HOST: &str = "CONN_HOST";
    /// LDAP port
    pub const CONN_LDAP_PORT: &str = "CONN_LDAP_PORT";
    /// Kerberos port
    pub const CONN_KRB5_PORT: &str = "CONN_KRB5_PORT";
    /// LDAPS flag
    pub const CONN_USE_LDAPS: &str = "CONN_USE_LDAPS";
    /// Realm
    pub const CONN_REALM: &str = "CONN_REALM";
    /// Operator principal
    pub const CONN_PRINCIPAL: &str = "CONN_PRINCIPAL";
    /// Operator password
    pub const CONN_CREDENTIALS: &str = "CONN_CREDENTIALS";
    /// SMS account name
    pub const SMS_ACCOUNT_NAME: &str = "SMS_ACCOUNT_NAME";
    /// SMS user name
    pub const SMS_USERNAME: &str = "SMS_USERNAME";
    /// SMS password
    pub const SMS_PASSWORD: &str = "SMS_PASSWORD";
    /// SMS transport URL
    pub const SMS_TRANSPORT_URL: &str = "SMS_TRANSPORT_URL";
    /// SMTP host
    pub const SMTP_HOST: &str = "SMTP_HOST";
    /// SMTP sender
    pub const SMTP_FROM: &str = "SMTP_FROM";
    /// SMTP subject
    pub const SMTP_SUBJECT: &str = "SMTP_SUBJECT";
    /// SMTP authentication flag
    pub const SMTP_AUTHENTICATE: &str = "SMTP_AUTHENTICATE";
    /// SMTP user name (only when authenticating)
    pub const SMTP_USERNAME: &str = "SMTP_USERNAME";
    /// SMTP password (only when authenticating)
    pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";
    /// Administration tool password
    pub const ADMIN_TOOL_PASSWORD: &str = "ADMIN_TOOL_PASSWORD";
    /// Passcode prompt flag
    pub const PROMPT_FOR_PASSCODE: &str = "PROMPT_FOR_PASSCODE";
    /// Presentation base URL
    pub const PRESENTATION_BASE_URL: &str = "PRESENTATION_BASE_URL";
}

/// Keys that must be present for a payload to count as a settings file
const REQUIRED_KEYS: [&str; 5] = [
    keys::CONN_HOST,
    keys::CONN_LDAP_PORT,
    keys::CONN_KRB5_PORT,
    keys::CONN_REALM,
    keys::CONN_PRINCIPAL,
];

/// Case-insensitive boolean; anything but `true` is false
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Flattens settings into ordered property entries
///
/// SMTP credentials are omitted entirely when SMTP authentication is off.
/// The vault passphrase and the one-time passcode are never included.
/// Values are wiped when the entries are dropped.
#[must_use]
pub fn to_entries(settings: &AdminToolSettings) -> Vec<(&'static str, Zeroizing<String>)> {
    let conn = settings.connection();
    let sms = settings.sms();
    let smtp = settings.smtp();

    let mut entries = vec![
        (keys::CONN_HOST, conn.host().to_string()),
        (keys::CONN_LDAP_PORT, conn.ldap_port().to_string()),
        (keys::CONN_KRB5_PORT, conn.krb5_port().to_string()),
        (keys::CONN_USE_LDAPS, bool_str(conn.use_ldaps()).to_string()),
        (keys::CONN_REALM, conn.realm().to_string()),
        (keys::CONN_PRINCIPAL, conn.principal().to_string()),
        (
            keys::CONN_CREDENTIALS,
            conn.credentials().expose_secret().to_string(),
        ),
        (keys::SMS_ACCOUNT_NAME, sms.account_name.clone()),
        (keys::SMS_USERNAME, sms.username.clone()),
        (keys::SMS_PASSWORD, sms.password.expose_secret().to_string()),
        (keys::SMS_TRANSPORT_URL, sms.transport_url.clone()),
        (keys::SMTP_HOST, smtp.host.clone()),
        (keys::SMTP_FROM, smtp.from.clone()),
        (keys::SMTP_SUBJECT, smtp.subject.clone()),
        (keys::SMTP_AUTHENTICATE, bool_str(smtp.authenticate).to_string()),
    ];

    if smtp.authenticate {
        entries.push((
            keys::SMTP_USERNAME,
            smtp.username.clone().unwrap_or_default(),
        ));
        entries.push((
            keys::SMTP_PASSWORD,
            smtp.password
                .as_ref()
                .map(|p| p.expose_secret().to_string())
                .unwrap_or_default(),
        ));
    }

    entries.push((
        keys::ADMIN_TOOL_PASSWORD,
        settings.admin_tool_password().expose_secret().to_string(),
    ));
    entries.push((
        keys::PROMPT_FOR_PASSCODE,
        bool_str(settings.prompt_for_passcode()).to_string(),
    ));
    entries.push((
        keys::PRESENTATION_BASE_URL,
        settings.presentation_base_url().to_string(),
    ));
    entries
        .into_iter()
        .map(|(key, value)| (key, Zeroizing::new(value)))
        .collect()
}

/// Rebuilds settings from a parsed property map
///
/// # Errors
///
/// Returns a description of the problem if a required key is missing or a
/// port is not a valid number
pub fn from_entries(
    map: &HashMap<String, String>,
    passphrase: SecretString,
) -> Result<AdminToolSettings, String> {
    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !map.contains_key(**k)) {
        return Err(format!("missing required key {missing}"));
    }

    let text = |key: &str| map.get(key).cloned().unwrap_or_default();
    let port = |key: &str| {
        text(key)
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("{key}: {e}"))
    };

    let mut connection = ConnectionInfoModifier::new()
        .with_host(text(keys::CONN_HOST))
        .with_ldap_port(port(keys::CONN_LDAP_PORT)?)
        .with_krb5_port(port(keys::CONN_KRB5_PORT)?)
        .with_ldaps(parse_bool(&text(keys::CONN_USE_LDAPS)))
        .with_realm(text(keys::CONN_REALM))
        .with_principal(text(keys::CONN_PRINCIPAL));
    connection.credentials = SecretString::from(text(keys::CONN_CREDENTIALS));

    let sms = SmsConfig {
        account_name: text(keys::SMS_ACCOUNT_NAME),
        username: text(keys::SMS_USERNAME),
        password: SecretString::from(text(keys::SMS_PASSWORD)),
        transport_url: text(keys::SMS_TRANSPORT_URL),
    };

    let mut smtp = SmtpConfig::new(
        text(keys::SMTP_HOST),
        text(keys::SMTP_FROM),
        text(keys::SMTP_SUBJECT),
    );
    let authenticate = map
        .get(keys::SMTP_AUTHENTICATE)
        .is_some_and(|v| parse_bool(v));
    if authenticate {
        smtp = smtp.with_authentication(text(keys::SMTP_USERNAME), text(keys::SMTP_PASSWORD));
    }

    let mut settings = AdminToolSettings::new();
    settings.set_connection(connection.info());
    settings.set_sms(sms);
    settings.set_smtp(smtp);
    settings.set_admin_tool_password(SecretString::from(text(keys::ADMIN_TOOL_PASSWORD)));
    if let Some(flag) = map.get(keys::PROMPT_FOR_PASSCODE) {
        settings.set_prompt_for_passcode(parse_bool(flag));
    }
    settings.set_presentation_base_url(text(keys::PRESENTATION_BASE_URL));
    settings.set_settings_passphrase(passphrase);
    Ok(settings)
}
