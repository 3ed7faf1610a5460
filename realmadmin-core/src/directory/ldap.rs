//! `ldap3`-backed directory connector

use ldap3::{LdapConn, LdapConnSettings, LdapError, Scope, SearchEntry};
use secrecy::ExposeSecret;

use super::{BindParameters, DirectoryClient, DirectoryConnector, rdn_value};
use crate::error::{ConnectError, ConnectResult};

/// LDAP result code for invalid credentials
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Opens synchronous `ldap3` sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct LdapDirectoryConnector;

impl LdapDirectoryConnector {
    /// Creates a connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DirectoryConnector for LdapDirectoryConnector {
    fn open(&self, params: &BindParameters) -> ConnectResult<Box<dyn DirectoryClient>> {
        // ldap3 wants the server address only; the base travels separately
        let server = server_url(&params.url);
        let settings = LdapConnSettings::new().set_conn_timeout(params.connect_timeout);

        tracing::debug!(url = %server, "Opening LDAP connection");
        let mut conn = LdapConn::with_settings(settings, server)
            .map_err(|e| ConnectError::Unreachable(format!("{server}: {e}")))?;

        let bind_error = |reason: String| ConnectError::Bind {
            url: params.url.clone(),
            bind_dn: params.bind_dn.clone(),
            reason,
        };
        conn.simple_bind(&params.bind_dn, params.bind_password().expose_secret())
            .map_err(|e| bind_error(e.to_string()))?
            .success()
            .map_err(|e| match e {
                LdapError::LdapResult { result } if result.rc == RC_INVALID_CREDENTIALS => {
                    bind_error("invalid credentials".to_string())
                }
                other => bind_error(other.to_string()),
            })?;

        if let Some(policy) = &params.policy {
            tracing::debug!(application = %policy.application, "Session bound to policy");
        }

        Ok(Box::new(LdapDirectoryClient {
            conn: Some(conn),
            base_dn: params.base_dn.clone(),
        }))
    }
}

/// Strips the DN path from an LDAP URL
fn server_url(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    match url[after_scheme..].find('/') {
        Some(slash) => &url[..after_scheme + slash],
        None => url,
    }
}

/// A bound `ldap3` session
pub struct LdapDirectoryClient {
    conn: Option<LdapConn>,
    base_dn: String,
}

impl LdapDirectoryClient {
    fn conn(&mut self) -> ConnectResult<&mut LdapConn> {
        self.conn
            .as_mut()
            .ok_or_else(|| ConnectError::Unreachable("session already closed".to_string()))
    }
}

impl DirectoryClient for LdapDirectoryClient {
    fn entries(&mut self) -> ConnectResult<Vec<String>> {
        let base = self.base_dn.clone();
        let (results, _) = self
            .conn()?
            .search(&base, Scope::OneLevel, "(objectClass=*)", vec!["1.1"])
            .and_then(ldap3::SearchResult::success)
            .map_err(|e| ConnectError::Unreachable(format!("search under {base} failed: {e}")))?;

        let mut names: Vec<String> = results
            .into_iter()
            .map(|entry| rdn_value(&SearchEntry::construct(entry).dn))
            .collect();
        names.sort();
        Ok(names)
    }

    fn close(&mut self) -> ConnectResult<()> {
        match self.conn.take() {
            Some(mut conn) => conn
                .unbind()
                .map_err(|e| ConnectError::Unreachable(format!("unbind failed: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for LdapDirectoryClient {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.unbind();
        }
    }
}
