//! In-memory directory used by the integration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use realmadmin_core::directory::{BindParameters, DirectoryClient, DirectoryConnector};
use realmadmin_core::error::{ConnectError, ConnectResult};
use secrecy::ExposeSecret;

/// Accepts binds whose DN and password match a registered account
///
/// The password compared is the one sent on the wire, passcode included.
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: Mutex<HashMap<String, String>>,
    entries: Vec<String>,
    pub binds: Mutex<Vec<BindParameters>>,
    pub open_sessions: Arc<AtomicUsize>,
    pub offline: Mutex<bool>,
}

impl MemoryDirectory {
    pub fn with_entries(entries: &[&str]) -> Self {
        Self {
            entries: entries.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn add_account(&self, bind_dn: &str, password: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(bind_dn.to_string(), password.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn open_count(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn bind_dns(&self) -> Vec<String> {
        self.binds
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.bind_dn.clone())
            .collect()
    }
}

struct MemoryClient {
    entries: Vec<String>,
    open_sessions: Arc<AtomicUsize>,
    closed: bool,
}

impl DirectoryClient for MemoryClient {
    fn entries(&mut self) -> ConnectResult<Vec<String>> {
        Ok(self.entries.clone())
    }

    fn close(&mut self) -> ConnectResult<()> {
        if !self.closed {
            self.closed = true;
            self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl DirectoryConnector for MemoryDirectory {
    fn open(&self, params: &BindParameters) -> ConnectResult<Box<dyn DirectoryClient>> {
        self.binds.lock().unwrap().push(params.clone());
        if *self.offline.lock().unwrap() {
            return Err(ConnectError::Unreachable("connection refused".to_string()));
        }

        let accounts = self.accounts.lock().unwrap();
        match accounts.get(&params.bind_dn) {
            Some(password) if password == params.bind_password().expose_secret() => {
                self.open_sessions.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(MemoryClient {
                    entries: self.entries.clone(),
                    open_sessions: Arc::clone(&self.open_sessions),
                    closed: false,
                }))
            }
            _ => Err(ConnectError::Bind {
                url: params.url.clone(),
                bind_dn: params.bind_dn.clone(),
                reason: "invalid credentials".to_string(),
            }),
        }
    }
}
