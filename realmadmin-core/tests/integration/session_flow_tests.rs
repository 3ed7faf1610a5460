//! Login-to-session flow tests
//!
//! Authenticates through `AuthenticationOrchestrator` with the directory bind
//! provider, then opens and closes a session with `SessionConnector`, all
//! against `MemoryDirectory`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use realmadmin_core::auth::{AuthenticationOrchestrator, DirectoryBindProviderFactory};
use realmadmin_core::directory::{DirectoryConnector, rdn_value, user_bind_dn};
use realmadmin_core::error::{AuthError, ConnectError};
use realmadmin_core::models::{ApplicationPolicy, ConnectionInfo, ConnectionInfoModifier};
use realmadmin_core::session::{
    ConnectionEvent, ConnectionSnapshot, ENV_CREDENTIALS, ENV_PRINCIPAL, ENV_REALM,
    SessionConnector, StartupConfig,
};
use secrecy::ExposeSecret;

use super::directory::MemoryDirectory;

const USER_DN: &str = "uid=alice,ou=Users,dc=example,dc=com";

fn directory() -> Arc<MemoryDirectory> {
    let dir = MemoryDirectory::with_entries(&["alice", "bob", "carol"]);
    dir.add_account(USER_DN, "wonderland");
    dir.add_account("uid=admin,ou=system", "secret");
    Arc::new(dir)
}

fn info(principal: &str, password: &str) -> ConnectionInfo {
    ConnectionInfoModifier::new()
        .with_host("dir.example.com")
        .with_ldap_port(10389)
        .with_realm("Example.COM")
        .with_principal(principal)
        .with_credentials(password)
        .info()
}

fn orchestrator(dir: &Arc<MemoryDirectory>) -> AuthenticationOrchestrator {
    let connector: Arc<dyn DirectoryConnector> = dir.clone();
    AuthenticationOrchestrator::new(Arc::new(DirectoryBindProviderFactory::new(connector)))
}

fn session(dir: &Arc<MemoryDirectory>) -> SessionConnector {
    let connector: Arc<dyn DirectoryConnector> = dir.clone();
    SessionConnector::new(connector)
}

#[test]
fn test_user_login_then_session() {
    let dir = directory();
    let policy = ApplicationPolicy::new("realm-admin").with_roles(["operator"]);
    let info = info("alice", "wonderland");

    let principal = orchestrator(&dir)
        .authenticate(&info, &policy)
        .expect("alice should authenticate");
    assert_eq!(principal.user_name(), "alice");
    assert_eq!(principal.profile.application, "realm-admin");
    assert_eq!(principal.profile.roles, vec!["operator".to_string()]);
    // The probe bind is closed straight away
    assert_eq!(dir.open_count(), 0);

    let mut session = session(&dir);
    session.connect(&info, &principal).expect("session should open");
    assert!(session.is_connected());
    assert_eq!(session.state().realm(), Some("Example.COM"));
    assert_eq!(dir.open_count(), 1);

    let entries = session
        .with_client(|client| client.entries())
        .expect("client present")
        .expect("entries listed");
    assert_eq!(entries, vec!["alice", "bob", "carol"]);

    assert!(session.disconnect());
    assert!(!session.is_connected());
    assert_eq!(dir.open_count(), 0);

    let binds = dir.binds.lock().unwrap();
    assert_eq!(binds.len(), 2);
    assert!(binds.iter().all(|p| p.bind_dn == USER_DN));
    assert!(binds.iter().all(|p| p.base_dn == "dc=example,dc=com"));
    assert_eq!(binds[1].url, "ldap://dir.example.com:10389/dc=example,dc=com");
    assert_eq!(
        binds[1].policy.as_ref().map(|p| p.application.as_str()),
        Some("realm-admin")
    );
}

#[test]
fn test_super_user_binds_as_system_entry() {
    let dir = directory();
    let info = info("admin", "secret");

    let principal = orchestrator(&dir)
        .authenticate(&info, &ApplicationPolicy::new("realm-admin"))
        .expect("admin should authenticate");

    let mut session = session(&dir);
    session.connect(&info, &principal).unwrap();
    assert_eq!(
        dir.bind_dns(),
        vec!["uid=admin,ou=system".to_string(), "uid=admin,ou=system".to_string()]
    );
}

#[test]
fn test_wrong_password_is_rejected_before_session() {
    let dir = directory();
    let err = orchestrator(&dir)
        .authenticate(&info("alice", "looking-glass"), &ApplicationPolicy::new("realm-admin"))
        .unwrap_err();

    assert!(matches!(err, AuthError::AuthenticationFailed(ref reason) if reason.contains("invalid credentials")));
    assert_eq!(dir.open_count(), 0);
}

#[test]
fn test_unreachable_directory_is_provider_error() {
    let dir = directory();
    dir.set_offline(true);
    let err = orchestrator(&dir)
        .authenticate(&info("alice", "wonderland"), &ApplicationPolicy::new("realm-admin"))
        .unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
}

#[test]
fn test_passcode_login_then_session() {
    let dir = directory();
    dir.add_account(USER_DN, "wonderland123456");
    let orchestrator = orchestrator(&dir).with_passcode_required(true);

    let missing = orchestrator
        .authenticate(&info("alice", "wonderland"), &ApplicationPolicy::new("realm-admin"))
        .unwrap_err();
    assert_eq!(missing, AuthError::MissingPasscode);

    let with_code = ConnectionInfoModifier::from(&info("alice", "wonderland"))
        .with_passcode("123456")
        .info();
    let principal = orchestrator
        .authenticate(&with_code, &ApplicationPolicy::new("realm-admin"))
        .expect("password plus passcode should bind");
    assert_eq!(principal.user_name(), "alice");

    let mut session = session(&dir);
    session
        .connect(&with_code, &principal)
        .expect("session binds with the same password and passcode");
    assert!(session.is_connected());
    assert_eq!(dir.open_count(), 1);

    let binds = dir.binds.lock().unwrap();
    let wire: Vec<String> = binds
        .iter()
        .map(|p| p.bind_password().expose_secret().to_string())
        .collect();
    assert_eq!(wire.last().map(String::as_str), Some("wonderland123456"));
    assert!(binds.iter().all(|p| p.password.expose_secret() == "wonderland"));
}

#[test]
fn test_descriptor_passcode_used_without_configuration() {
    let dir = directory();
    dir.add_account(USER_DN, "wonderland123456");
    let with_code = ConnectionInfoModifier::from(&info("alice", "wonderland"))
        .with_passcode("123456")
        .info();

    // Login and session must agree on the password sent
    let principal = orchestrator(&dir)
        .authenticate(&with_code, &ApplicationPolicy::new("realm-admin"))
        .expect("passcode from the descriptor is presented at login");
    let mut session = session(&dir);
    session.connect(&with_code, &principal).unwrap();

    let binds = dir.binds.lock().unwrap();
    assert_eq!(binds.len(), 2);
    assert!(
        binds
            .iter()
            .all(|p| p.bind_password().expose_secret() == "wonderland123456")
    );
}

#[test]
fn test_padded_admin_principal_is_an_ordinary_user() {
    let dir = directory();
    let padded_dn = user_bind_dn("admin ", "dc=example,dc=com");
    dir.add_account(&padded_dn, "padded");
    let info = info("admin ", "padded");

    let principal = orchestrator(&dir)
        .authenticate(&info, &ApplicationPolicy::new("realm-admin"))
        .expect("padded name authenticates as a user entry");
    assert_eq!(principal.user_name(), "admin ");

    let mut session = session(&dir);
    session.connect(&info, &principal).expect("session binds the same entry");
    assert_eq!(dir.bind_dns(), vec![padded_dn.clone(), padded_dn]);
    assert!(!dir.bind_dns().iter().any(|dn| dn == "uid=admin,ou=system"));
}

#[test]
fn test_user_name_with_dn_specials_stays_one_entry() {
    let dir = directory();
    let escaped_dn = user_bind_dn("smith, john", "dc=example,dc=com");
    dir.add_account(&escaped_dn, "hunter2");
    let info = info("smith, john", "hunter2");

    let principal = orchestrator(&dir)
        .authenticate(&info, &ApplicationPolicy::new("realm-admin"))
        .expect("escaped DN binds");
    let mut session = session(&dir);
    session.connect(&info, &principal).unwrap();

    let dns = dir.bind_dns();
    assert_eq!(dns, vec![escaped_dn.clone(), escaped_dn.clone()]);
    assert_ne!(escaped_dn, "uid=smith, john,ou=Users,dc=example,dc=com");
    assert_eq!(rdn_value(&escaped_dn), "smith, john");
}

#[test]
fn test_failed_connect_clears_previous_session() {
    let dir = directory();
    let info = info("alice", "wonderland");
    let principal = orchestrator(&dir)
        .authenticate(&info, &ApplicationPolicy::new("realm-admin"))
        .unwrap();

    let mut session = session(&dir);
    session.connect(&info, &principal).unwrap();
    assert_eq!(dir.open_count(), 1);

    dir.set_offline(true);
    let err = session.connect(&info, &principal).unwrap_err();
    assert!(matches!(err, ConnectError::Unreachable(_)));
    assert!(!session.is_connected());
    assert!(session.state().last_failure().is_some());
    assert!(session.state().session_id().is_none());
    assert_eq!(dir.open_count(), 0, "old handle must be released");
}

#[test]
fn test_observers_and_events_see_the_lifecycle() {
    let dir = directory();
    let info = info("alice", "wonderland");
    let principal = orchestrator(&dir)
        .authenticate(&info, &ApplicationPolicy::new("realm-admin"))
        .unwrap();

    let seen: Arc<Mutex<Vec<ConnectionSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let mut session = session(&dir);
    let sink = Arc::clone(&seen);
    session.register_observer(move |snapshot: &ConnectionSnapshot| {
        sink.lock().unwrap().push(snapshot.clone());
    });
    let mut events = session.subscribe();

    session.connect(&info, &principal).unwrap();
    let session_id = session.state().session_id().expect("session id");
    session.disconnect();
    // Disconnecting twice is a no-op and publishes nothing
    session.disconnect();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].connected);
    assert_eq!(seen[0].session_id, Some(session_id));
    assert!(!seen[1].connected);

    assert_eq!(
        events.try_recv().unwrap(),
        ConnectionEvent::Connected {
            session_id,
            realm: "Example.COM".to_string(),
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        ConnectionEvent::Disconnected { session_id }
    );
    assert!(events.try_recv().is_err());
}

#[test]
fn test_startup_connect_uses_environment() {
    let dir = Arc::new(MemoryDirectory::with_entries(&["alice"]));
    dir.add_account("uid=admin,ou=system", "startup-secret");

    let env: HashMap<String, String> = [
        (ENV_REALM, "example.com"),
        (ENV_PRINCIPAL, "uid=admin,ou=system"),
        (ENV_CREDENTIALS, "startup-secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut session = session(&dir);
    session
        .connect_startup(&StartupConfig::new(10389), &env)
        .expect("startup bind should succeed");

    assert!(session.is_connected());
    assert_eq!(session.state().realm(), Some("example.com"));
    let binds = dir.binds.lock().unwrap();
    assert_eq!(binds[0].url, "ldap://localhost:10389/dc=example,dc=com");
    assert!(binds[0].policy.is_none());
}
