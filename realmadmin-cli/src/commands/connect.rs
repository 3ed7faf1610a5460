//! Directory login and session commands.

use std::fmt::Write as _;
use std::sync::Arc;

use realmadmin_core::auth::{AuthenticationOrchestrator, DirectoryBindProviderFactory};
use realmadmin_core::directory::{DirectoryConnector, LdapDirectoryConnector};
use realmadmin_core::models::{ApplicationPolicy, ConnectionInfo, ConnectionInfoModifier};
use realmadmin_core::session::{SessionConnector, StartupConfig, parse_env_pairs};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::cli::{ConnectArgs, OutputFormat};
use crate::error::CliError;
use crate::util::{Context, read_secret};

/// What a finished session reports
#[derive(Debug, Serialize)]
pub struct SessionReport {
    /// Authenticated principal, `name@realm`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    /// Realm of the session
    pub realm: String,
    /// Session correlation ID
    pub session_id: Option<String>,
    /// Administered entry names
    pub entries: Vec<String>,
}

/// Connect command handler
pub fn cmd_connect(context: &Context, args: &ConnectArgs) -> Result<(), CliError> {
    let (info, ask_passcode) = build_connection_info(context, args)?;
    info.validate()?;

    let directory = &context.config.directory;
    let connector: Arc<dyn DirectoryConnector> = Arc::new(LdapDirectoryConnector::new());
    let factory = DirectoryBindProviderFactory::new(Arc::clone(&connector));
    let orchestrator = AuthenticationOrchestrator::new(Arc::new(factory))
        .with_passcode_required(ask_passcode || info.passcode().is_some())
        .with_connect_timeout(directory.connect_timeout());

    let policy = ApplicationPolicy::new(args.application.clone()).with_roles(args.roles.clone());
    let principal = orchestrator.authenticate(&info, &policy)?;

    let mut session =
        SessionConnector::new(connector).with_connect_timeout(directory.connect_timeout());
    session.connect(&info, &principal)?;

    let report = collect_report(&mut session, Some(principal.to_string()), info.realm());
    if !session.disconnect() {
        tracing::warn!("Directory session did not close cleanly");
    }
    print_report(&report?, args.format)
}

/// Co-located directory command handler
pub fn cmd_connect_local(
    context: &Context,
    host: &str,
    port: u16,
    ldaps: bool,
    env: &[String],
    format: OutputFormat,
) -> Result<(), CliError> {
    let env = parse_env_pairs(env)?;
    let startup = StartupConfig::new(port).with_host(host).with_ldaps(ldaps);

    let connector: Arc<dyn DirectoryConnector> = Arc::new(LdapDirectoryConnector::new());
    let mut session = SessionConnector::new(connector)
        .with_connect_timeout(context.config.directory.connect_timeout());
    session.connect_startup(&startup, &env)?;

    let realm = session.state().realm().unwrap_or_default().to_string();
    let report = collect_report(&mut session, None, &realm);
    if !session.disconnect() {
        tracing::warn!("Directory session did not close cleanly");
    }
    print_report(&report?, format)
}

/// Merges stored settings, configuration defaults and command-line options
///
/// Returns the descriptor and whether a passcode must be asked for.
fn build_connection_info(
    context: &Context,
    args: &ConnectArgs,
) -> Result<(ConnectionInfo, bool), CliError> {
    let defaults = &context.config.directory;
    let (mut modifier, mut ask_passcode) = if args.from_settings {
        let settings = context
            .vault
            .load(&context.passphrase()?, None)?
            .ok_or_else(|| {
                CliError::Vault(format!(
                    "no settings file at {}",
                    context.vault.default_path().display()
                ))
            })?;
        (
            ConnectionInfoModifier::from(settings.connection()),
            settings.prompt_for_passcode(),
        )
    } else {
        (
            ConnectionInfoModifier::new()
                .with_ldap_port(defaults.default_ldap_port)
                .with_krb5_port(defaults.default_krb5_port)
                .with_ldaps(defaults.default_use_ldaps),
            false,
        )
    };
    ask_passcode |= args.ask_passcode;

    if let Some(host) = &args.host {
        modifier.host.clone_from(host);
    }
    if let Some(port) = args.ldap_port {
        modifier.ldap_port = port;
    }
    if let Some(port) = args.krb5_port {
        modifier.krb5_port = port;
    }
    if let Some(ldaps) = args.ldaps {
        modifier.use_ldaps = ldaps;
    }
    if let Some(realm) = &args.realm {
        modifier.realm.clone_from(realm);
    }
    if let Some(principal) = &args.principal {
        modifier.principal.clone_from(principal);
    }

    if args.password.is_some() || modifier.credentials.expose_secret().is_empty() {
        modifier.credentials = read_secret(
            &format!("Password for {}: ", modifier.principal),
            args.password.as_deref(),
        )?;
    }
    if args.passcode.is_some() || ask_passcode {
        modifier.passcode = Some(read_secret("One-time passcode: ", args.passcode.as_deref())?);
    }

    Ok((modifier.info(), ask_passcode))
}

fn collect_report(
    session: &mut SessionConnector,
    principal: Option<String>,
    realm: &str,
) -> Result<SessionReport, CliError> {
    let session_id = session.state().session_id().map(|id| id.to_string());
    let entries = session
        .with_client(|client| client.entries())
        .transpose()?
        .unwrap_or_default();
    Ok(SessionReport {
        principal,
        realm: realm.to_string(),
        session_id,
        entries,
    })
}

fn print_report(report: &SessionReport, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => println!("{}", format_report(report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| CliError::Input(format!("Failed to serialize: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Formats a session report as text
#[must_use]
pub fn format_report(report: &SessionReport) -> String {
    let mut output = String::new();
    match &report.principal {
        Some(principal) => {
            let _ = writeln!(output, "Connected to {} as {principal}", report.realm);
        }
        None => {
            let _ = writeln!(output, "Connected to {}", report.realm);
        }
    }
    if report.entries.is_empty() {
        output.push_str("No administered entries found.");
        return output;
    }
    let _ = writeln!(output, "\nENTRY");
    let width = report.entries.iter().map(String::len).max().unwrap_or(5).max(5);
    let _ = writeln!(output, "{:-<width$}", "");
    for entry in &report.entries {
        let _ = writeln!(output, "{entry}");
    }
    output.trim_end().to_string()
}
