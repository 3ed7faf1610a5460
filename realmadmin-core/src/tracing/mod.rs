//! Structured logging for `realmadmin`
//!
//! Wraps `tracing-subscriber` setup and defines the span and field names used
//! by the authentication, session, vault and configuration operations.
//! Secrets are never recorded; principal names appear at debug level only.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static SUBSCRIBER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors from subscriber setup
#[derive(Debug, Error)]
pub enum TracingError {
    /// The subscriber or its filter could not be built
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// A global subscriber is already installed
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// The log file could not be opened
    #[error("Failed to open log file: {0}")]
    FileCreationFailed(String),

    /// A level name was not recognized
    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Log verbosity, least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    #[default]
    Warn,
    /// Adds progress messages
    Info,
    /// Adds diagnostics
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    const ALL: [Self; 5] = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];

    /// Lower-case name, as used in filter directives
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Level for `-v` counts starting at `Warn`; `quiet` wins
    #[must_use]
    pub const fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Error;
        }
        match verbose {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(Self::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| TracingError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
    /// Appended to this file, which is created if missing
    File(PathBuf),
}

/// Subscriber settings handed to [`init_tracing`]
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Verbosity for both `realmadmin` crates
    pub level: TracingLevel,
    /// Destination
    pub output: TracingOutput,
    /// Raw `EnvFilter` directive; wins over `level` and `RUST_LOG`
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Warn-level logging to stderr
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Replaces the destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets a raw filter directive
    #[must_use]
    pub fn with_filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = Some(directive.into());
        self
    }

    /// `level` for our crates, `warn` for dependencies
    fn default_directive(&self) -> String {
        let level = self.level.as_str();
        format!("realmadmin_core={level},realmadmin_cli={level},warn")
    }
}

/// Installs the global subscriber
///
/// The filter is taken from `config.filter`, then from `RUST_LOG`, then from
/// `config.level`. Only the first call can succeed.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed, the filter
/// directive is invalid, or the log file cannot be opened
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if SUBSCRIBER_INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = build_filter(config)?;
    let (writer, ansi) = build_writer(&config.output)?;

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, "Tracing initialized");
    Ok(())
}

fn build_filter(config: &TracingConfig) -> TracingResult<EnvFilter> {
    if let Some(directive) = &config.filter {
        return EnvFilter::try_new(directive)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()));
    }
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(config.default_directive())
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))
}

fn build_writer(output: &TracingOutput) -> TracingResult<(BoxMakeWriter, bool)> {
    Ok(match output {
        TracingOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        TracingOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        TracingOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    TracingError::FileCreationFailed(format!("{}: {e}", path.display()))
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    })
}

/// Creates an info-level span for a `realmadmin` operation
///
/// ```ignore
/// use realmadmin_core::trace_operation;
/// use realmadmin_core::tracing::span_names;
///
/// let _span = trace_operation!(span_names::SESSION_CONNECT, url = %url).entered();
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Standard span names
pub mod span_names {
    /// Credential-challenge exchange
    pub const AUTH_AUTHENTICATE: &str = "auth.authenticate";
    /// Directory bind
    pub const SESSION_CONNECT: &str = "session.connect";
    /// Directory unbind
    pub const SESSION_DISCONNECT: &str = "session.disconnect";
    /// Settings file write
    pub const VAULT_STORE: &str = "vault.store";
    /// Settings file read
    pub const VAULT_LOAD: &str = "vault.load";
    /// Configuration load
    pub const CONFIG_LOAD: &str = "config.load";
}
