//! Opening and closing the administrative directory session

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::broadcast;

use super::startup::{ENV_CREDENTIALS, ENV_PRINCIPAL, ENV_REALM, StartupConfig, require_env};
use super::state::{ConnectionEvent, ConnectionObserver, ConnectionState};
use crate::directory::{
    ADMIN_BIND_DN, BindParameters, DEFAULT_CONNECT_TIMEOUT, DirectoryClient, DirectoryConnector,
    user_bind_dn,
};
use crate::error::{ConnectError, ConnectResult};
use crate::models::{ApplicationPolicy, ConnectionInfo, Principal, realm_to_base_dn};
use crate::tracing::span_names;

/// Bind DN for a connection descriptor and authenticated principal
///
/// The super-user binds as the fixed system entry; everyone else binds
/// under `ou=Users` of the realm base with the profile's user name. Only the
/// exact principal `admin` is the super-user, matching the login check.
#[must_use]
pub fn resolve_bind_dn(info: &ConnectionInfo, principal: &Principal) -> String {
    if info.is_super_user() {
        ADMIN_BIND_DN.to_string()
    } else {
        user_bind_dn(principal.user_name(), &info.ldap_realm_base())
    }
}

/// Turns credentials into an open directory session
///
/// Owns the `ConnectionState`. Calls take `&mut self`, so one instance serves
/// one attempt at a time.
pub struct SessionConnector {
    connector: Arc<dyn DirectoryConnector>,
    state: ConnectionState,
    connect_timeout: Duration,
}

impl SessionConnector {
    /// Creates a disconnected session connector
    #[must_use]
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            connector,
            state: ConnectionState::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the bind timeout passed to the directory connector
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Current connection state
    #[must_use]
    pub const fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Whether a session is open
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Adds a state observer
    pub fn register_observer(&mut self, observer: impl ConnectionObserver + 'static) {
        self.state.register_observer(observer);
    }

    /// Subscribes to connection events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.state.subscribe()
    }

    /// Opens a session for an authenticated principal
    ///
    /// Binds to `info.ldap_url()` with the DN from [`resolve_bind_dn`] and
    /// `info.credentials`. An open session is closed first.
    ///
    /// # Errors
    ///
    /// Returns the connector's `ConnectError`; the state is then cleared and
    /// the error recorded as the last failure
    pub fn connect(&mut self, info: &ConnectionInfo, principal: &Principal) -> ConnectResult<()> {
        let policy = (!principal.profile.application.is_empty()).then(|| {
            ApplicationPolicy::new(principal.profile.application.clone())
                .with_roles(principal.profile.roles.clone())
        });
        let params = BindParameters {
            url: info.ldap_url(),
            bind_dn: resolve_bind_dn(info, principal),
            password: info.credentials().clone(),
            passcode: info.passcode().cloned(),
            base_dn: info.ldap_realm_base(),
            policy,
            connect_timeout: self.connect_timeout,
        };

        let result = if info.host().trim().is_empty() {
            Err(ConnectError::InvalidInfo("host is empty".to_string()))
        } else {
            Ok(params)
        };
        self.open(result, info.realm().to_string())
    }

    /// Opens a session against a co-located directory
    ///
    /// The realm comes from `kdc.primary.realm`, the bind DN and password
    /// from `java.naming.security.principal` and
    /// `java.naming.security.credentials`. No login exchange takes place.
    ///
    /// # Errors
    ///
    /// - `ConnectError::MissingEnv` if a required key is absent
    /// - the connector's `ConnectError` if the bind fails
    pub fn connect_startup(
        &mut self,
        config: &StartupConfig,
        env: &HashMap<String, String>,
    ) -> ConnectResult<()> {
        let lookup = || -> ConnectResult<(String, BindParameters)> {
            let realm = require_env(env, ENV_REALM)?.to_string();
            let bind_dn = require_env(env, ENV_PRINCIPAL)?.to_string();
            let password = SecretString::from(require_env(env, ENV_CREDENTIALS)?.to_string());
            let base_dn = realm_to_base_dn(&realm);
            let scheme = if config.use_ldaps { "ldaps" } else { "ldap" };
            let params = BindParameters {
                url: format!("{scheme}://{}:{}/{base_dn}", config.host, config.ldap_port),
                bind_dn,
                password,
                passcode: None,
                base_dn,
                policy: None,
                connect_timeout: self.connect_timeout,
            };
            Ok((realm, params))
        };

        match lookup() {
            Ok((realm, params)) => self.open(Ok(params), realm),
            Err(e) => self.open(Err(e), String::new()),
        }
    }

    /// Closes the open session, if any
    ///
    /// Returns `true` when no session was open or it closed cleanly. The state
    /// is cleared either way.
    pub fn disconnect(&mut self) -> bool {
        let session_id = self.state.session_id();
        let _span = crate::trace_operation!(
            span_names::SESSION_DISCONNECT,
            session_id = ?session_id
        )
        .entered();

        match self.state.mark_disconnected() {
            None => true,
            Some(mut client) => match client.close() {
                Ok(()) => {
                    tracing::info!("Directory session closed");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Directory session did not close cleanly");
                    false
                }
            },
        }
    }

    /// Runs `f` with the open client handle
    ///
    /// Returns `None` if no session is open.
    pub fn with_client<R>(&mut self, f: impl FnOnce(&mut dyn DirectoryClient) -> R) -> Option<R> {
        match self.state.client_mut() {
            Some(client) => Some(f(client)),
            None => None,
        }
    }

    fn open(&mut self, params: ConnectResult<BindParameters>, realm: String) -> ConnectResult<()> {
        if self.state.is_connected() {
            tracing::debug!("Closing the open session before reconnecting");
            self.disconnect();
        }

        let opened = params.and_then(|params| {
            let _span = crate::trace_operation!(span_names::SESSION_CONNECT, url = %params.url)
                .entered();
            tracing::debug!(bind_dn = %params.bind_dn, "Binding");
            self.connector.open(&params)
        });

        match opened {
            Ok(client) => {
                let session_id = self.state.mark_connected(realm, client);
                tracing::info!(session_id = %session_id, "Directory session opened");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Directory session could not be opened");
                self.state.mark_failed(e.to_string());
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SessionConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConnector")
            .field("state", &self.state)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl Drop for SessionConnector {
    fn drop(&mut self) {
        if let Some(mut client) = self.state.mark_disconnected() {
            let _ = client.close();
        }
    }
}
