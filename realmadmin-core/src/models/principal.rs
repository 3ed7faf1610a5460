//! Authenticated principals and application policies

use std::fmt;

use serde::{Deserialize, Serialize};

/// Application-scoped authorization descriptor bound to a session
///
/// Names the application whose roles the session may exercise, optionally
/// narrowed to a subset of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPolicy {
    /// Application name
    pub application: String,
    /// Roles the session is restricted to (empty = all granted roles)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl ApplicationPolicy {
    /// Creates a policy for the given application with no role restriction
    #[must_use]
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            roles: Vec::new(),
        }
    }

    /// Restricts the policy to the given roles
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for ApplicationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.application)
    }
}

/// Authorization profile resolved for an authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationProfile {
    /// Directory user name the profile belongs to
    pub user_name: String,
    /// Application the profile was resolved for
    pub application: String,
    /// Effective roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Effective permissions
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// An authenticated identity plus its authorization profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal name as authenticated
    pub name: String,
    /// Realm the principal belongs to
    pub realm: String,
    /// Resolved authorization profile
    pub profile: AuthorizationProfile,
}

impl Principal {
    /// Creates a principal
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        realm: impl Into<String>,
        profile: AuthorizationProfile,
    ) -> Self {
        Self {
            name: name.into(),
            realm: realm.into(),
            profile,
        }
    }

    /// Directory user name resolved from the authorization profile
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.profile.user_name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.realm)
    }
}
