//! Operator authentication
//!
//! An `AuthenticationProvider` drives a credential-challenge exchange: it
//! raises `Challenge`s and a `ChallengeHandler` answers them. The
//! `AuthenticationOrchestrator` answers from a `ConnectionInfo` and an
//! `ApplicationPolicy`, and returns the authenticated `Principal`.

mod bind;
mod orchestrator;

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;

use crate::directory::DEFAULT_CONNECT_TIMEOUT;
use crate::error::AuthResult;
use crate::models::{ApplicationPolicy, ConnectionInfo, Principal};

pub use bind::{DirectoryBindProvider, DirectoryBindProviderFactory};
pub use orchestrator::AuthenticationOrchestrator;

/// A request for one piece of authentication input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// Principal name
    Name,
    /// Password
    Secret,
    /// Realm
    Realm,
    /// One-time passcode
    Passcode,
    /// Authorization policy to bind to the session
    PolicyBinding,
    /// Any challenge kind without a built-in answer
    Other(String),
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Secret => write!(f, "secret"),
            Self::Realm => write!(f, "realm"),
            Self::Passcode => write!(f, "passcode"),
            Self::PolicyBinding => write!(f, "policy"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// Answer to a `Challenge`
#[derive(Clone)]
pub enum ChallengeResponse {
    /// Textual answer (names are sent this way too)
    Text(SecretString),
    /// Policy answer to `Challenge::PolicyBinding`
    Policy(ApplicationPolicy),
}

impl ChallengeResponse {
    /// Wraps plain text
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(SecretString::from(value.into()))
    }
}

impl fmt::Debug for ChallengeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text([REDACTED])"),
            Self::Policy(policy) => f.debug_tuple("Policy").field(policy).finish(),
        }
    }
}

/// Answers challenges raised by a provider
pub trait ChallengeHandler {
    /// Produces the answer for `challenge`
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the challenge cannot be answered; the
    /// provider aborts the exchange with that error
    fn respond(&mut self, challenge: &Challenge) -> AuthResult<ChallengeResponse>;
}

impl<F> ChallengeHandler for F
where
    F: FnMut(&Challenge) -> AuthResult<ChallengeResponse>,
{
    fn respond(&mut self, challenge: &Challenge) -> AuthResult<ChallengeResponse> {
        self(challenge)
    }
}

/// Runs one login exchange
pub trait AuthenticationProvider {
    /// Authenticates by raising challenges through `handler`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` on rejection, or whatever
    /// error the handler returned for a challenge
    fn login(&self, handler: &mut dyn ChallengeHandler) -> AuthResult<Principal>;
}

/// Construction options for providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Whether the directory super-user may authenticate
    pub allow_admin_bind: bool,
    /// Whether the provider asks for a one-time passcode
    pub require_passcode: bool,
    /// Timeout for any directory round-trip the provider makes
    pub connect_timeout: Duration,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            allow_admin_bind: false,
            require_passcode: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ProviderOptions {
    /// Sets whether the super-user may authenticate
    #[must_use]
    pub const fn with_admin_bind(mut self, allow: bool) -> Self {
        self.allow_admin_bind = allow;
        self
    }

    /// Sets whether a passcode is requested
    #[must_use]
    pub const fn with_passcode(mut self, require: bool) -> Self {
        self.require_passcode = require;
        self
    }

    /// Sets the directory timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Builds providers for a target directory
pub trait ProviderFactory: Send + Sync {
    /// Creates a provider for the directory described by `info`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if no provider can be built
    fn create(
        &self,
        info: &ConnectionInfo,
        options: &ProviderOptions,
    ) -> AuthResult<Box<dyn AuthenticationProvider>>;
}
