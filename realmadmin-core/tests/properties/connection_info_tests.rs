//! Property tests for connection descriptors and bind DN derivation

use proptest::prelude::*;
use realmadmin_core::directory::{ADMIN_BIND_DN, rdn_value, user_bind_dn};
use realmadmin_core::models::{
    AuthorizationProfile, ConnectionInfoModifier, Principal, SUPER_USER, realm_to_base_dn,
};
use realmadmin_core::session::resolve_bind_dn;

/// Generates a dotted realm of one to four labels
fn arb_realm() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z][A-Za-z0-9-]{0,10}", 1..5).prop_map(|labels| labels.join("."))
}

/// Generates a valid hostname
fn arb_hostname() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,20}(\\.[a-z][a-z0-9-]{0,10})*")
        .unwrap()
        .prop_filter("hostname must not be empty", |s| !s.is_empty())
}

/// Generates a non-admin user name
fn arb_user() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_filter("must not be the super-user", |s| s != SUPER_USER)
}

fn principal(user: &str, realm: &str) -> Principal {
    Principal::new(
        user,
        realm,
        AuthorizationProfile {
            user_name: user.to_string(),
            ..AuthorizationProfile::default()
        },
    )
}

proptest! {
    #[test]
    fn realm_base_has_one_component_per_label(realm in arb_realm()) {
        let base = realm_to_base_dn(&realm);
        let labels: Vec<&str> = realm.split('.').collect();
        let components: Vec<&str> = base.split(',').collect();

        prop_assert_eq!(components.len(), labels.len());
        for (component, label) in components.iter().zip(&labels) {
            prop_assert_eq!(*component, format!("dc={}", label.to_lowercase()));
        }
    }

    #[test]
    fn realm_base_ignores_case(realm in arb_realm()) {
        prop_assert_eq!(
            realm_to_base_dn(&realm.to_uppercase()),
            realm_to_base_dn(&realm.to_lowercase())
        );
    }

    #[test]
    fn ldap_url_matches_scheme_and_parts(
        host in arb_hostname(),
        port in 1u16..65535,
        ldaps in any::<bool>(),
        realm in arb_realm(),
    ) {
        let info = ConnectionInfoModifier::new()
            .with_host(host.clone())
            .with_ldap_port(port)
            .with_ldaps(ldaps)
            .with_realm(realm.clone())
            .with_principal("operator")
            .info();

        let url = info.ldap_url();
        let scheme = if ldaps { "ldaps://" } else { "ldap://" };
        prop_assert!(url.starts_with(scheme));
        prop_assert_eq!(
            url,
            format!("{scheme}{host}:{port}/{}", realm_to_base_dn(&realm))
        );
        prop_assert_eq!(info.ldap_realm_base(), realm_to_base_dn(&realm));
    }

    #[test]
    fn valid_descriptors_validate(
        host in arb_hostname(),
        port in 1u16..65535,
        realm in arb_realm(),
        user in arb_user(),
    ) {
        let info = ConnectionInfoModifier::new()
            .with_host(host)
            .with_ldap_port(port)
            .with_realm(realm)
            .with_principal(user)
            .info();
        prop_assert!(info.validate().is_ok());
    }

    #[test]
    fn user_bind_dn_lives_under_users(user in arb_user(), realm in arb_realm()) {
        let info = ConnectionInfoModifier::new()
            .with_host("dir")
            .with_realm(realm.clone())
            .with_principal(user.clone())
            .info();

        let dn = resolve_bind_dn(&info, &principal(&user, &realm));
        prop_assert_eq!(&dn, &user_bind_dn(&user, &realm_to_base_dn(&realm)));
        let expected_prefix = format!("uid={user},ou=Users,");
        prop_assert!(dn.starts_with(&expected_prefix));
        prop_assert!(dn.ends_with(&realm_to_base_dn(&realm)));
    }

    #[test]
    fn any_user_name_stays_one_rdn(user in "[ -~]{1,20}", realm in arb_realm()) {
        let base = realm_to_base_dn(&realm);
        let dn = user_bind_dn(&user, &base);
        prop_assert_eq!(rdn_value(&dn), user);
        let expected_suffix = format!(",ou=Users,{base}");
        prop_assert!(dn.ends_with(&expected_suffix));
    }

    #[test]
    fn super_user_always_binds_as_system_admin(realm in arb_realm(), user in arb_user()) {
        let info = ConnectionInfoModifier::new()
            .with_host("dir")
            .with_realm(realm.clone())
            .with_principal(SUPER_USER)
            .info();

        prop_assert_eq!(resolve_bind_dn(&info, &principal(&user, &realm)), ADMIN_BIND_DN);
    }

    #[test]
    fn modifier_round_trip_preserves_descriptor(
        host in arb_hostname(),
        port in 1u16..65535,
        krb5 in 1u16..65535,
        realm in arb_realm(),
        user in arb_user(),
        password in "[ -~]{0,24}",
    ) {
        let info = ConnectionInfoModifier::new()
            .with_host(host)
            .with_ldap_port(port)
            .with_krb5_port(krb5)
            .with_realm(realm)
            .with_principal(user)
            .with_credentials(password)
            .info();

        let copy = ConnectionInfoModifier::from(&info).info();
        prop_assert_eq!(copy, info);
    }
}

#[test]
fn empty_realm_yields_empty_base() {
    assert_eq!(realm_to_base_dn(""), "");
    assert_eq!(realm_to_base_dn("example..com"), "dc=example,dc=com");
}

#[test]
fn invalid_realm_rejected() {
    let info = ConnectionInfoModifier::new()
        .with_host("dir")
        .with_realm("not a realm")
        .with_principal("operator")
        .info();
    assert!(info.validate().is_err());
}
