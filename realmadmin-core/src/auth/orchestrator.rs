//! Credential-challenge orchestration

use std::sync::Arc;
use std::time::Duration;

use super::{Challenge, ChallengeResponse, ProviderFactory, ProviderOptions};
use crate::error::{AuthError, AuthResult};
use crate::models::{ApplicationPolicy, ConnectionInfo, Principal};
use crate::tracing::span_names;

/// Authenticates operators through a pluggable provider
///
/// Providers are always built with the super-user bind permitted. A
/// descriptor carrying a passcode always gets the passcode challenge, so the
/// verified password matches the one the session later binds with. The
/// orchestrator touches no session state.
#[derive(Clone)]
pub struct AuthenticationOrchestrator {
    factory: Arc<dyn ProviderFactory>,
    options: ProviderOptions,
}

impl AuthenticationOrchestrator {
    /// Creates an orchestrator using `factory`
    #[must_use]
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            options: ProviderOptions::default().with_admin_bind(true),
        }
    }

    /// Asks providers for a one-time passcode
    #[must_use]
    pub const fn with_passcode_required(mut self, required: bool) -> Self {
        self.options = self.options.with_passcode(required);
        self
    }

    /// Sets the directory timeout handed to providers
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_connect_timeout(timeout);
        self
    }

    /// Options providers are built with
    #[must_use]
    pub const fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Runs the challenge exchange for `info` under `policy`
    ///
    /// # Errors
    ///
    /// - `AuthError::AuthenticationFailed` if the provider rejects the operator
    /// - `AuthError::MissingPasscode` if a passcode is asked for but absent
    /// - `AuthError::UnsupportedChallenge` for challenge kinds without an answer
    /// - `AuthError::Provider` if the provider cannot be built or fails
    pub fn authenticate(
        &self,
        info: &ConnectionInfo,
        policy: &ApplicationPolicy,
    ) -> AuthResult<Principal> {
        let _span = crate::trace_operation!(
            span_names::AUTH_AUTHENTICATE,
            realm = %info.realm(),
            application = %policy.application
        )
        .entered();

        let options = if info.passcode().is_some() {
            self.options.with_passcode(true)
        } else {
            self.options
        };
        let provider = self.factory.create(info, &options)?;
        let mut handler = |challenge: &Challenge| answer(info, policy, challenge);

        match provider.login(&mut handler) {
            Ok(principal) => {
                tracing::debug!(principal = %principal, "Authenticated");
                Ok(principal)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Authentication failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthenticationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationOrchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Answers one challenge from the connection descriptor and policy
fn answer(
    info: &ConnectionInfo,
    policy: &ApplicationPolicy,
    challenge: &Challenge,
) -> AuthResult<ChallengeResponse> {
    match challenge {
        Challenge::Name => Ok(ChallengeResponse::text(info.principal())),
        Challenge::Secret => Ok(ChallengeResponse::Text(info.credentials().clone())),
        Challenge::Realm => Ok(ChallengeResponse::text(info.realm())),
        Challenge::Passcode => info
            .passcode()
            .cloned()
            .map(ChallengeResponse::Text)
            .ok_or(AuthError::MissingPasscode),
        Challenge::PolicyBinding => Ok(ChallengeResponse::Policy(policy.clone())),
        Challenge::Other(kind) => Err(AuthError::UnsupportedChallenge(kind.clone())),
    }
}
