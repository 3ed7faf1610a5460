//! Property tests for the encrypted settings file

use proptest::prelude::*;
use realmadmin_core::models::{AdminToolSettings, ConnectionInfoModifier, SmsConfig, SmtpConfig};
use realmadmin_core::vault::{CredentialVault, EncryptionStrength};
use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;

/// Generates printable text including property-format special characters
fn arb_text() -> impl Strategy<Value = String> {
    "[ -~]{0,24}"
}

fn arb_smtp() -> impl Strategy<Value = SmtpConfig> {
    (
        arb_text(),
        arb_text(),
        arb_text(),
        prop::option::of((arb_text(), arb_text())),
    )
        .prop_map(|(host, from, subject, auth)| {
            let smtp = SmtpConfig::new(host, from, subject);
            match auth {
                Some((user, password)) => smtp.with_authentication(user, password),
                None => smtp,
            }
        })
}

fn arb_settings() -> impl Strategy<Value = AdminToolSettings> {
    (
        (
            "[a-z][a-z0-9.-]{0,20}",
            1u16..65535,
            1u16..65535,
            any::<bool>(),
            "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
            "[a-z][a-z0-9_]{0,12}",
            arb_text(),
        ),
        (arb_text(), arb_text(), arb_text(), arb_text()),
        arb_smtp(),
        (arb_text(), any::<bool>(), arb_text()),
    )
        .prop_map(|(conn, sms, smtp, rest)| {
            let (host, ldap, krb5, ldaps, realm, principal, credentials) = conn;
            let (account, user, password, url) = sms;
            let (admin_password, prompt, presentation) = rest;

            let mut settings = AdminToolSettings::new();
            settings.set_connection(
                ConnectionInfoModifier::new()
                    .with_host(host)
                    .with_ldap_port(ldap)
                    .with_krb5_port(krb5)
                    .with_ldaps(ldaps)
                    .with_realm(realm)
                    .with_principal(principal)
                    .with_credentials(credentials)
                    .info(),
            );
            settings.set_sms(SmsConfig {
                account_name: account,
                username: user,
                password: SecretString::from(password),
                transport_url: url,
            });
            settings.set_smtp(smtp);
            settings.set_admin_tool_password(SecretString::from(admin_password));
            settings.set_prompt_for_passcode(prompt);
            settings.set_presentation_base_url(presentation);
            settings
        })
}

fn fast_vault(dir: &TempDir) -> CredentialVault {
    CredentialVault::with_path(dir.path().join("settings")).with_strength(EncryptionStrength::Fast)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn store_then_load_returns_equal_settings(
        mut settings in arb_settings(),
        passphrase in "[ -~]{1,16}",
    ) {
        let dir = TempDir::new().unwrap();
        let vault = fast_vault(&dir);
        settings.set_settings_passphrase(SecretString::from(passphrase.clone()));

        vault.store(&settings, None).unwrap();
        let loaded = vault
            .load(&SecretString::from(passphrase.clone()), None)
            .unwrap()
            .unwrap();

        prop_assert_eq!(&loaded, &settings);
        prop_assert_eq!(
            loaded.settings_passphrase().map(ExposeSecret::expose_secret),
            Some(passphrase.as_str())
        );
    }

    #[test]
    fn smtp_credentials_follow_authenticate_flag(
        mut settings in arb_settings(),
    ) {
        let dir = TempDir::new().unwrap();
        let vault = fast_vault(&dir);
        let passphrase = SecretString::from("pass".to_string());
        settings.set_settings_passphrase(passphrase.clone());

        vault.store(&settings, None).unwrap();
        let loaded = vault.load(&passphrase, None).unwrap().unwrap();

        let smtp = loaded.smtp();
        prop_assert_eq!(smtp.authenticate, settings.smtp().authenticate);
        prop_assert_eq!(smtp.username.is_some(), smtp.authenticate);
        prop_assert_eq!(smtp.password.is_some(), smtp.authenticate);
    }

    #[test]
    fn other_passphrase_never_opens_file(
        mut settings in arb_settings(),
        right in "[a-z]{4,12}",
        wrong in "[A-Z]{4,12}",
    ) {
        let dir = TempDir::new().unwrap();
        let vault = fast_vault(&dir);
        settings.set_settings_passphrase(SecretString::from(right));

        vault.store(&settings, None).unwrap();
        prop_assert!(vault.load(&SecretString::from(wrong), None).is_err());
    }
}
