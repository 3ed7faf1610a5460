//! Data model for `realmadmin`
//!
//! Connection descriptors, gateway configurations, the settings bundle and
//! authenticated principals.

mod connection_info;
mod gateway;
mod principal;
mod settings;

pub use connection_info::{
    ConnectionInfo, ConnectionInfoModifier, DEFAULT_KRB5_PORT, DEFAULT_LDAP_PORT, SUPER_USER,
    realm_to_base_dn,
};
pub use gateway::{SmsConfig, SmtpConfig};
pub use principal::{ApplicationPolicy, AuthorizationProfile, Principal};
pub use settings::{AdminToolSettings, DEFAULT_PROMPT_FOR_PASSCODE};
