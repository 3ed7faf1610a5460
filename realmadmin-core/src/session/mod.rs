//! Directory sessions and their observable state

mod connector;
mod startup;
mod state;

pub use connector::{SessionConnector, resolve_bind_dn};
pub use startup::{
    DEFAULT_STARTUP_HOST, ENV_CREDENTIALS, ENV_PRINCIPAL, ENV_REALM, StartupConfig,
    parse_env_pairs, require_env,
};
pub use state::{ConnectionEvent, ConnectionObserver, ConnectionSnapshot, ConnectionState};
