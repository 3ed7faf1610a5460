//! Settings file tests against real files in a temporary directory

use realmadmin_core::config::{AdminConfig, ConfigManager};
use realmadmin_core::error::VaultError;
use realmadmin_core::models::{AdminToolSettings, ConnectionInfoModifier, SmtpConfig};
use realmadmin_core::vault::{CredentialVault, EncryptionStrength, VAULT_MAGIC};
use secrecy::SecretString;
use tempfile::TempDir;

fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn sample_settings(pass: &str) -> AdminToolSettings {
    let mut settings = AdminToolSettings::new();
    settings.set_connection(
        ConnectionInfoModifier::new()
            .with_host("dir.example.com")
            .with_ldap_port(10636)
            .with_ldaps(true)
            .with_realm("example.com")
            .with_principal("admin")
            .with_credentials("p=a:s#s!w\\ord")
            .info(),
    );
    settings.set_smtp(
        SmtpConfig::new("mail.example.com", "ops@example.com", "Your code")
            .with_authentication("relay", "relay-pass"),
    );
    settings.set_presentation_base_url("https://admin.example.com/");
    settings.set_settings_passphrase(passphrase(pass));
    settings
}

fn vault(dir: &TempDir) -> CredentialVault {
    CredentialVault::with_path(dir.path().join("nested").join(".realmadmin-settings"))
        .with_strength(EncryptionStrength::Fast)
}

#[test]
fn test_store_creates_parent_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let vault = vault(&dir);
    let settings = sample_settings("correct horse");

    vault.store(&settings, None).unwrap();
    assert!(vault.default_path().exists());

    let raw = std::fs::read(vault.default_path()).unwrap();
    assert!(raw.starts_with(VAULT_MAGIC));
    let lossy = String::from_utf8_lossy(&raw);
    assert!(!lossy.contains("dir.example.com"));
    assert!(!lossy.contains("relay-pass"));

    let loaded = vault.load(&passphrase("correct horse"), None).unwrap().unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_wrong_passphrase_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let vault = vault(&dir);
    vault.store(&sample_settings("right"), None).unwrap();
    let before = std::fs::read(vault.default_path()).unwrap();

    let err = vault.load(&passphrase("wrong"), None).unwrap_err();
    assert_eq!(err, VaultError::CorruptOrWrongPassphrase);

    let changed = vault.change_passphrase(&passphrase("wrong"), passphrase("new"), None);
    assert_eq!(changed, Err(VaultError::CorruptOrWrongPassphrase));
    assert_eq!(std::fs::read(vault.default_path()).unwrap(), before);
}

#[test]
fn test_truncated_file_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let vault = vault(&dir);
    vault.store(&sample_settings("pass"), None).unwrap();

    let raw = std::fs::read(vault.default_path()).unwrap();
    std::fs::write(vault.default_path(), &raw[..raw.len() / 2]).unwrap();

    assert_eq!(
        vault.load(&passphrase("pass"), None).unwrap_err(),
        VaultError::CorruptOrWrongPassphrase
    );
}

#[test]
fn test_change_passphrase_then_reload() {
    let dir = TempDir::new().unwrap();
    let vault = vault(&dir);
    let settings = sample_settings("first");
    vault.store(&settings, None).unwrap();

    assert!(vault.change_passphrase(&passphrase("first"), passphrase("second"), None).unwrap());
    assert!(vault.load(&passphrase("first"), None).is_err());

    let loaded = vault.load(&passphrase("second"), None).unwrap().unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_store_to_explicit_target_leaves_default_alone() {
    let dir = TempDir::new().unwrap();
    let vault = vault(&dir);
    let other = dir.path().join("exported.bin");

    vault.store(&sample_settings("pass"), Some(other.as_path())).unwrap();

    assert!(other.exists());
    assert!(!vault.default_path().exists());
    assert!(vault.load(&passphrase("pass"), None).unwrap().is_none());
    assert!(vault.load(&passphrase("pass"), Some(other.as_path())).unwrap().is_some());
}

#[test]
fn test_configured_vault_path_is_used() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().join("config"));
    let target = dir.path().join("from-config.bin");

    let mut config = AdminConfig::default();
    config.vault.path = Some(target.display().to_string());
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    let path = loaded.vault.resolved_path().expect("configured path");
    assert_eq!(path, target);

    let vault = CredentialVault::with_path(path).with_strength(EncryptionStrength::Fast);
    vault.store(&sample_settings("pass"), None).unwrap();
    assert!(target.exists());
}
