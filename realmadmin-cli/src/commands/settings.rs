//! Settings file commands.

use std::fmt::Write as _;

use realmadmin_core::models::{AdminToolSettings, ConnectionInfoModifier, SmtpConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::cli::{OutputFormat, SaveArgs, SettingsCommands};
use crate::error::CliError;
use crate::util::{Context, mask, read_secret};

/// Settings command handler
pub fn cmd_settings(context: &Context, subcmd: SettingsCommands) -> Result<(), CliError> {
    match subcmd {
        SettingsCommands::Show { format } => cmd_show(context, format),
        SettingsCommands::Save(args) => cmd_save(context, &args),
        SettingsCommands::Passphrase { new_passphrase } => {
            cmd_passphrase(context, new_passphrase.as_deref())
        }
    }
}

/// Display form of the settings with every secret masked
#[derive(Debug, Serialize)]
pub struct SettingsView {
    /// Directory host
    pub host: String,
    /// LDAP port
    pub ldap_port: u16,
    /// Kerberos port
    pub krb5_port: u16,
    /// LDAPS flag
    pub use_ldaps: bool,
    /// Realm
    pub realm: String,
    /// Operator principal
    pub principal: String,
    /// Masked operator password
    pub credentials: &'static str,
    /// SMS account
    pub sms_account: String,
    /// SMS user
    pub sms_user: String,
    /// Masked SMS password
    pub sms_password: &'static str,
    /// SMS transport URL
    pub sms_url: String,
    /// SMTP host
    pub smtp_host: String,
    /// SMTP sender
    pub smtp_from: String,
    /// SMTP subject
    pub smtp_subject: String,
    /// SMTP authentication flag
    pub smtp_authenticate: bool,
    /// SMTP user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_user: Option<String>,
    /// Masked admin tool password
    pub admin_password: &'static str,
    /// Passcode prompt flag
    pub prompt_for_passcode: bool,
    /// Presentation base URL
    pub presentation_url: String,
}

impl From<&AdminToolSettings> for SettingsView {
    fn from(settings: &AdminToolSettings) -> Self {
        let conn = settings.connection();
        let sms = settings.sms();
        let smtp = settings.smtp();
        Self {
            host: conn.host().to_string(),
            ldap_port: conn.ldap_port(),
            krb5_port: conn.krb5_port(),
            use_ldaps: conn.use_ldaps(),
            realm: conn.realm().to_string(),
            principal: conn.principal().to_string(),
            credentials: mask(conn.credentials().expose_secret()),
            sms_account: sms.account_name.clone(),
            sms_user: sms.username.clone(),
            sms_password: mask(sms.password.expose_secret()),
            sms_url: sms.transport_url.clone(),
            smtp_host: smtp.host.clone(),
            smtp_from: smtp.from.clone(),
            smtp_subject: smtp.subject.clone(),
            smtp_authenticate: smtp.authenticate,
            smtp_user: smtp.username.clone(),
            admin_password: mask(settings.admin_tool_password().expose_secret()),
            prompt_for_passcode: settings.prompt_for_passcode(),
            presentation_url: settings.presentation_base_url().to_string(),
        }
    }
}

fn cmd_show(context: &Context, format: OutputFormat) -> Result<(), CliError> {
    let passphrase = context.passphrase()?;
    let Some(settings) = context.vault.load(&passphrase, None)? else {
        println!(
            "No settings file at {}",
            context.vault.default_path().display()
        );
        return Ok(());
    };

    let view = SettingsView::from(&settings);
    match format {
        OutputFormat::Table => println!("{}", format_view(&view)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&view)
                .map_err(|e| CliError::Input(format!("Failed to serialize: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Formats the settings view as aligned `KEY  VALUE` lines
#[must_use]
pub fn format_view(view: &SettingsView) -> String {
    let rows: Vec<(&str, String)> = vec![
        ("Host", view.host.clone()),
        ("LDAP port", view.ldap_port.to_string()),
        ("Kerberos port", view.krb5_port.to_string()),
        ("LDAPS", view.use_ldaps.to_string()),
        ("Realm", view.realm.clone()),
        ("Principal", view.principal.clone()),
        ("Password", view.credentials.to_string()),
        ("SMS account", view.sms_account.clone()),
        ("SMS user", view.sms_user.clone()),
        ("SMS password", view.sms_password.to_string()),
        ("SMS URL", view.sms_url.clone()),
        ("SMTP host", view.smtp_host.clone()),
        ("SMTP from", view.smtp_from.clone()),
        ("SMTP subject", view.smtp_subject.clone()),
        ("SMTP auth", view.smtp_authenticate.to_string()),
        ("SMTP user", view.smtp_user.clone().unwrap_or_default()),
        ("Admin password", view.admin_password.to_string()),
        ("Prompt for passcode", view.prompt_for_passcode.to_string()),
        ("Presentation URL", view.presentation_url.clone()),
    ];
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut output = String::new();
    for (key, value) in rows {
        let _ = writeln!(output, "{key:<width$}  {value}");
    }
    output.trim_end().to_string()
}

fn cmd_save(context: &Context, args: &SaveArgs) -> Result<(), CliError> {
    let passphrase = context.passphrase()?;
    let mut settings = context
        .vault
        .load(&passphrase, None)?
        .unwrap_or_default();

    apply_overrides(&mut settings, args);
    settings.set_settings_passphrase(passphrase);
    context.vault.store(&settings, None)?;

    println!(
        "Settings saved to {}",
        context.vault.default_path().display()
    );
    Ok(())
}

/// Applies the options that were given; the rest keep their stored value
pub fn apply_overrides(settings: &mut AdminToolSettings, args: &SaveArgs) {
    let mut conn = ConnectionInfoModifier::from(settings.connection());
    if let Some(host) = &args.host {
        conn.host.clone_from(host);
    }
    if let Some(port) = args.ldap_port {
        conn.ldap_port = port;
    }
    if let Some(port) = args.krb5_port {
        conn.krb5_port = port;
    }
    if let Some(ldaps) = args.ldaps {
        conn.use_ldaps = ldaps;
    }
    if let Some(realm) = &args.realm {
        conn.realm.clone_from(realm);
    }
    if let Some(principal) = &args.principal {
        conn.principal.clone_from(principal);
    }
    if let Some(credentials) = &args.credentials {
        conn.credentials = SecretString::from(credentials.clone());
    }
    settings.set_connection(conn.info());

    let mut sms = settings.sms().clone();
    if let Some(account) = &args.sms_account {
        sms.account_name.clone_from(account);
    }
    if let Some(user) = &args.sms_user {
        sms.username.clone_from(user);
    }
    if let Some(password) = &args.sms_password {
        sms.password = SecretString::from(password.clone());
    }
    if let Some(url) = &args.sms_url {
        sms.transport_url.clone_from(url);
    }
    settings.set_sms(sms);

    let mut smtp: SmtpConfig = settings.smtp().clone();
    if let Some(host) = &args.smtp_host {
        smtp.host.clone_from(host);
    }
    if let Some(from) = &args.smtp_from {
        smtp.from.clone_from(from);
    }
    if let Some(subject) = &args.smtp_subject {
        smtp.subject.clone_from(subject);
    }
    if let (Some(user), Some(password)) = (&args.smtp_user, &args.smtp_password) {
        smtp = smtp.with_authentication(user.clone(), password.clone());
    }
    if args.no_smtp_auth {
        smtp.clear_authentication();
    }
    settings.set_smtp(smtp);

    if let Some(password) = &args.admin_password {
        settings.set_admin_tool_password(SecretString::from(password.clone()));
    }
    if let Some(prompt) = args.prompt_for_passcode {
        settings.set_prompt_for_passcode(prompt);
    }
    if let Some(url) = &args.presentation_url {
        settings.set_presentation_base_url(url.clone());
    }
}

fn cmd_passphrase(context: &Context, new_passphrase: Option<&str>) -> Result<(), CliError> {
    let old = context.passphrase()?;
    let new = match new_passphrase {
        Some(value) => SecretString::from(value.to_string()),
        None => {
            let first = read_secret("New settings passphrase: ", None)?;
            let second = read_secret("Repeat new passphrase: ", None)?;
            if first.expose_secret() != second.expose_secret() {
                return Err(CliError::Input("passphrases do not match".to_string()));
            }
            first
        }
    };
    if new.expose_secret().is_empty() {
        return Err(CliError::Input("passphrase must not be empty".to_string()));
    }

    if !context.vault.change_passphrase(&old, new, None)? {
        return Err(CliError::Vault(format!(
            "no settings file at {}",
            context.vault.default_path().display()
        )));
    }
    println!("Passphrase changed");
    Ok(())
}
