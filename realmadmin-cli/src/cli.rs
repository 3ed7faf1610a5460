//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// `realmadmin` command-line interface for directory administration sessions
#[derive(Parser)]
#[command(name = "realmadmin-cli")]
#[command(author, version, about = "realmadmin command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "REALMADMIN_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Path to the encrypted settings file
    #[arg(long, global = true, env = "REALMADMIN_VAULT")]
    pub vault: Option<PathBuf>,

    /// Settings file passphrase (prompted when absent)
    #[arg(
        long,
        global = true,
        env = "REALMADMIN_VAULT_PASSPHRASE",
        hide_env_values = true
    )]
    pub passphrase: Option<String>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate, open a session and list administered entries
    #[command(about = "Log in to a directory and list administered entries")]
    Connect(ConnectArgs),

    /// Bind to a co-located directory using its startup environment
    #[command(about = "Connect to a co-located directory without an operator login")]
    ConnectLocal {
        /// Directory host
        #[arg(short = 'H', long, default_value = "localhost")]
        host: String,

        /// LDAP port of the running directory
        #[arg(short, long)]
        port: u16,

        /// Use LDAPS
        #[arg(long)]
        ldaps: bool,

        /// Startup environment entry (repeatable), e.g. kdc.primary.realm=example.com
        #[arg(short, long = "env")]
        env: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Manage the encrypted settings file
    #[command(subcommand)]
    Settings(SettingsCommands),
}

/// Options for `connect`
#[derive(Args)]
pub struct ConnectArgs {
    /// Start from the connection stored in the settings file
    #[arg(long)]
    pub from_settings: bool,

    /// Directory host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// LDAP port
    #[arg(long)]
    pub ldap_port: Option<u16>,

    /// Kerberos port
    #[arg(long)]
    pub krb5_port: Option<u16>,

    /// Use LDAPS
    #[arg(long)]
    pub ldaps: Option<bool>,

    /// Realm, e.g. example.com
    #[arg(short, long)]
    pub realm: Option<String>,

    /// Operator principal
    #[arg(short, long)]
    pub principal: Option<String>,

    /// Operator password (prompted when absent)
    #[arg(long, env = "REALMADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// One-time passcode
    #[arg(long, env = "REALMADMIN_PASSCODE", hide_env_values = true)]
    pub passcode: Option<String>,

    /// Prompt for a one-time passcode
    #[arg(long)]
    pub ask_passcode: bool,

    /// Application whose policy is bound to the session
    #[arg(short, long, default_value = "realm-admin")]
    pub application: String,

    /// Restrict the session to a role (repeatable)
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

/// Settings file subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show the stored settings with secrets masked
    #[command(about = "Decrypt and display the settings file")]
    Show {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Create or update the settings file
    #[command(about = "Write values into the settings file")]
    Save(SaveArgs),

    /// Re-encrypt the settings file under a new passphrase
    #[command(about = "Change the settings file passphrase")]
    Passphrase {
        /// New passphrase (prompted when absent)
        #[arg(long, env = "REALMADMIN_NEW_VAULT_PASSPHRASE", hide_env_values = true)]
        new_passphrase: Option<String>,
    },
}

/// Values for `settings save`; unset options keep their stored value
#[derive(Args, Default)]
pub struct SaveArgs {
    /// Directory host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// LDAP port
    #[arg(long)]
    pub ldap_port: Option<u16>,

    /// Kerberos port
    #[arg(long)]
    pub krb5_port: Option<u16>,

    /// Use LDAPS
    #[arg(long)]
    pub ldaps: Option<bool>,

    /// Realm
    #[arg(short, long)]
    pub realm: Option<String>,

    /// Operator principal
    #[arg(short, long)]
    pub principal: Option<String>,

    /// Operator password
    #[arg(long, env = "REALMADMIN_PASSWORD", hide_env_values = true)]
    pub credentials: Option<String>,

    /// SMS account name
    #[arg(long)]
    pub sms_account: Option<String>,

    /// SMS user name
    #[arg(long)]
    pub sms_user: Option<String>,

    /// SMS password
    #[arg(long)]
    pub sms_password: Option<String>,

    /// SMS transport URL
    #[arg(long)]
    pub sms_url: Option<String>,

    /// SMTP host
    #[arg(long)]
    pub smtp_host: Option<String>,

    /// SMTP sender address
    #[arg(long)]
    pub smtp_from: Option<String>,

    /// SMTP subject line
    #[arg(long)]
    pub smtp_subject: Option<String>,

    /// SMTP user name (enables SMTP authentication)
    #[arg(long, requires = "smtp_password")]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[arg(long, requires = "smtp_user")]
    pub smtp_password: Option<String>,

    /// Disable SMTP authentication and drop stored SMTP credentials
    #[arg(long, conflicts_with = "smtp_user")]
    pub no_smtp_auth: bool,

    /// Administration tool password
    #[arg(long)]
    pub admin_password: Option<String>,

    /// Whether to prompt for a one-time passcode on connect
    #[arg(long)]
    pub prompt_for_passcode: Option<bool>,

    /// Presentation base URL
    #[arg(long)]
    pub presentation_url: Option<String>,
}

/// Output format
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
}
