//! Authentication by directory bind
//!
//! The provider collects name, secret, realm and policy through challenges,
//! binds once with them to prove the credentials, and releases the probe
//! session immediately. The authorization profile is taken from the policy.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::{
    AuthenticationProvider, Challenge, ChallengeHandler, ChallengeResponse, ProviderFactory,
    ProviderOptions,
};
use crate::directory::{ADMIN_BIND_DN, BindParameters, DirectoryConnector, user_bind_dn};
use crate::error::{AuthError, AuthResult, ConnectError};
use crate::models::{
    ApplicationPolicy, AuthorizationProfile, ConnectionInfo, Principal, SUPER_USER,
    realm_to_base_dn,
};

/// Builds `DirectoryBindProvider`s over a shared connector
#[derive(Clone)]
pub struct DirectoryBindProviderFactory {
    connector: Arc<dyn DirectoryConnector>,
}

impl DirectoryBindProviderFactory {
    /// Creates a factory whose providers bind through `connector`
    #[must_use]
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self { connector }
    }
}

impl ProviderFactory for DirectoryBindProviderFactory {
    fn create(
        &self,
        info: &ConnectionInfo,
        options: &ProviderOptions,
    ) -> AuthResult<Box<dyn AuthenticationProvider>> {
        if info.host().trim().is_empty() {
            return Err(AuthError::Provider("no directory host configured".to_string()));
        }
        Ok(Box::new(DirectoryBindProvider {
            connector: Arc::clone(&self.connector),
            scheme: if info.use_ldaps() { "ldaps" } else { "ldap" },
            host: info.host().to_string(),
            port: info.ldap_port(),
            options: *options,
        }))
    }
}

/// Proves operator credentials with a simple bind
pub struct DirectoryBindProvider {
    connector: Arc<dyn DirectoryConnector>,
    scheme: &'static str,
    host: String,
    port: u16,
    options: ProviderOptions,
}

impl DirectoryBindProvider {
    fn bind_dn(&self, name: &str, base_dn: &str) -> AuthResult<String> {
        if name == SUPER_USER {
            if !self.options.allow_admin_bind {
                return Err(AuthError::AuthenticationFailed(
                    "super-user bind is not permitted".to_string(),
                ));
            }
            return Ok(ADMIN_BIND_DN.to_string());
        }
        Ok(user_bind_dn(name, base_dn))
    }
}

impl AuthenticationProvider for DirectoryBindProvider {
    fn login(&self, handler: &mut dyn ChallengeHandler) -> AuthResult<Principal> {
        let name = ask_text(handler, &Challenge::Name)?;
        let name = name.expose_secret().to_string();
        let secret = ask_text(handler, &Challenge::Secret)?;
        let realm = ask_text(handler, &Challenge::Realm)?;
        let realm = realm.expose_secret().trim().to_string();

        let passcode = if self.options.require_passcode {
            Some(ask_text(handler, &Challenge::Passcode)?)
        } else {
            None
        };
        let policy = ask_policy(handler)?;

        if name.trim().is_empty() {
            return Err(AuthError::AuthenticationFailed("empty principal name".to_string()));
        }

        let base_dn = realm_to_base_dn(&realm);
        let params = BindParameters {
            url: format!("{}://{}:{}/{base_dn}", self.scheme, self.host, self.port),
            bind_dn: self.bind_dn(&name, &base_dn)?,
            password: secret,
            passcode,
            base_dn,
            policy: Some(policy.clone()),
            connect_timeout: self.options.connect_timeout,
        };
        tracing::debug!(bind_dn = %params.bind_dn, "Verifying credentials");

        let mut probe = self.connector.open(&params).map_err(|e| match e {
            ConnectError::Bind { reason, .. } => AuthError::AuthenticationFailed(reason),
            other => AuthError::Provider(other.to_string()),
        })?;
        if let Err(e) = probe.close() {
            tracing::debug!(error = %e, "Probe session did not close cleanly");
        }

        let profile = AuthorizationProfile {
            user_name: name.clone(),
            application: policy.application,
            roles: policy.roles,
            permissions: Vec::new(),
        };
        Ok(Principal::new(name, realm, profile))
    }
}

fn ask_text(handler: &mut dyn ChallengeHandler, challenge: &Challenge) -> AuthResult<SecretString> {
    match handler.respond(challenge)? {
        ChallengeResponse::Text(text) => Ok(text),
        ChallengeResponse::Policy(_) => Err(AuthError::Provider(format!(
            "expected text for the {challenge} challenge"
        ))),
    }
}

fn ask_policy(handler: &mut dyn ChallengeHandler) -> AuthResult<ApplicationPolicy> {
    match handler.respond(&Challenge::PolicyBinding)? {
        ChallengeResponse::Policy(policy) => Ok(policy),
        ChallengeResponse::Text(_) => Err(AuthError::Provider(
            "expected a policy for the policy challenge".to_string(),
        )),
    }
}
