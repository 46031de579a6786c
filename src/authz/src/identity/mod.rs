//! Identity context
//!
//! An [`Identity`] is the set of roles held by the current caller. It is
//! produced by the login flow, replaced wholesale on re-login and emptied on
//! logout. Untyped role codes are validated once, here, so the rest of the
//! crate only ever sees catalog members.

pub mod store;

pub use store::{current_identity, FileSessionStore, InMemorySessionStore, SessionStore};

use crate::error::Result;
use crate::role::Role;
use crate::types::UserType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Authentication state derived from the role set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityState {
    Unauthenticated,
    Authenticated,
}

/// Deduplicated, unordered set of roles held by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    roles: BTreeSet<Role>,
}

impl Identity {
    /// Identity holding no roles
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// Build from untyped role codes, rejecting the whole identity on the
    /// first code outside the catalog
    pub fn from_codes<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = BTreeSet::new();
        for code in codes {
            let code = code.as_ref();
            match code.parse::<Role>() {
                Ok(role) => {
                    roles.insert(role);
                }
                Err(e) => {
                    warn!("Rejecting identity with unknown role code '{}'", code);
                    return Err(e);
                }
            }
        }
        Ok(Self { roles })
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_authenticated(&self) -> bool {
        !self.roles.is_empty()
    }

    pub fn state(&self) -> IdentityState {
        if self.is_authenticated() {
            IdentityState::Authenticated
        } else {
            IdentityState::Unauthenticated
        }
    }

    /// Distinct user types across the held roles
    pub fn user_types(&self) -> BTreeSet<UserType> {
        self.roles.iter().map(Role::user_type).collect()
    }
}

impl FromIterator<Role> for Identity {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Authenticated session as persisted by the login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub identity: Identity,
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            identity,
            authenticated_at: Utc::now(),
        }
    }
}
