//! Property tests for error types

use realmadmin_core::error::{AuthError, ConfigError, ConnectError, RealmAdminError, VaultError};

// ============================================================================
// AuthError Tests
// ============================================================================

#[test]
fn auth_error_failed_has_reason() {
    let err = AuthError::AuthenticationFailed("invalid credentials".to_string());
    let msg = err.to_string();
    assert!(msg.contains("failed"));
    assert!(msg.contains("invalid credentials"));
}

#[test]
fn auth_error_unsupported_challenge_names_kind() {
    let err = AuthError::UnsupportedChallenge("fingerprint".to_string());
    assert!(err.to_string().contains("fingerprint"));
}

#[test]
fn auth_error_missing_passcode_mentions_passcode() {
    assert!(AuthError::MissingPasscode.to_string().contains("passcode"));
}

// ============================================================================
// ConnectError Tests
// ============================================================================

#[test]
fn connect_error_bind_has_all_parts() {
    let err = ConnectError::Bind {
        url: "ldap://dir:10389/dc=example,dc=com".to_string(),
        bind_dn: "uid=alice,ou=Users,dc=example,dc=com".to_string(),
        reason: "invalid credentials".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("uid=alice"));
    assert!(msg.contains("ldap://dir:10389"));
    assert!(msg.contains("invalid credentials"));
}

#[test]
fn connect_error_missing_env_names_key() {
    let err = ConnectError::MissingEnv("kdc.primary.realm".to_string());
    assert!(err.to_string().contains("kdc.primary.realm"));
}

// ============================================================================
// VaultError Tests
// ============================================================================

#[test]
fn vault_error_corrupt_does_not_distinguish_cause() {
    let msg = VaultError::CorruptOrWrongPassphrase.to_string();
    assert!(msg.contains("corrupt"));
    assert!(msg.contains("passphrase"));
}

#[test]
fn vault_error_io_has_message() {
    let err = VaultError::Io("permission denied".to_string());
    assert!(err.to_string().contains("permission denied"));
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn subsystem_errors_convert_transparently() {
    let auth: RealmAdminError = AuthError::MissingPasscode.into();
    assert_eq!(auth.to_string(), AuthError::MissingPasscode.to_string());

    let vault: RealmAdminError = VaultError::PassphraseRequired.into();
    assert!(matches!(vault, RealmAdminError::Vault(VaultError::PassphraseRequired)));

    let config: RealmAdminError = ConfigError::Validation("host is empty".to_string()).into();
    assert!(config.to_string().contains("host is empty"));

    let connect: RealmAdminError = ConnectError::Unreachable("refused".to_string()).into();
    assert!(matches!(connect, RealmAdminError::Connect(_)));
}
