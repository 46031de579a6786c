//! Permission matrix
//!
//! One row per role, five pattern sets per row (view, create, edit, delete,
//! approve). A matrix can only be obtained through [`MatrixBuilder::build`],
//! which checks the full Role × ActionKind cross product, so lookups on a
//! built matrix never fail.
//!
//! # Example
//!
//! ```rust
//! use campus_authz::matrix::PermissionMatrix;
//! use campus_authz::{ActionKind, Role};
//!
//! let matrix = PermissionMatrix::builtin().unwrap();
//! let approve = matrix.entry(Role::FacilityManager, ActionKind::Approve);
//! assert!(approve.contains("YeuCauMuonPhong"));
//! ```

mod builtin;
pub mod config;

pub use builtin::default_matrix;
pub use config::{ActionSetsConfig, MatrixConfig};

use crate::error::{AuthzError, Result};
use crate::role::Role;
use crate::types::{ActionKind, ResourceId, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// How a permission set granted a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grant {
    /// The set holds `*`
    Wildcard,
    /// The set holds the identifier verbatim
    Exact,
}

/// Resource identifiers granted for one (role, action) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    wildcard: bool,
    entries: BTreeSet<String>,
}

impl PermissionSet {
    /// Set granting nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set granting every resource
    pub fn wildcard() -> Self {
        Self {
            wildcard: true,
            entries: BTreeSet::new(),
        }
    }

    /// Build a set from configured entries, rejecting malformed identifiers
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        for entry in entries {
            let entry = entry.as_ref();
            if entry == WILDCARD {
                set.wildcard = true;
                continue;
            }
            let id = ResourceId::parse(entry)
                .map_err(|e| AuthzError::InvalidConfig(e.to_string()))?;
            set.entries.insert(id.into());
        }
        Ok(set)
    }

    /// Wildcard membership or exact membership
    pub fn contains(&self, resource: &str) -> bool {
        self.grant_for(resource).is_some()
    }

    /// Which kind of grant covers `resource`, if any
    pub fn grant_for(&self, resource: &str) -> Option<Grant> {
        if self.wildcard {
            Some(Grant::Wildcard)
        } else if self.entries.contains(resource) {
            Some(Grant::Exact)
        } else {
            None
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn is_empty(&self) -> bool {
        !self.wildcard && self.entries.is_empty()
    }

    /// Explicit entries, excluding the wildcard
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries in configuration form, wildcard first
    pub fn to_entries(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries.len() + 1);
        if self.wildcard {
            out.push(WILDCARD.to_string());
        }
        out.extend(self.entries.iter().cloned());
        out
    }
}

/// Validated, immutable permission matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    rows: Vec<[PermissionSet; 5]>,
}

impl PermissionMatrix {
    /// Start an empty builder
    pub fn builder() -> MatrixBuilder {
        MatrixBuilder::new()
    }

    /// The matrix shipped with the crate
    pub fn builtin() -> Result<Self> {
        builtin::build()
    }

    /// Permission set for one (role, action) pair
    pub fn entry(&self, role: Role, action: ActionKind) -> &PermissionSet {
        &self.rows[role.index()][action.index()]
    }

    /// Export in the JSON configuration shape
    pub fn to_config(&self) -> MatrixConfig {
        MatrixConfig::from_matrix(self)
    }
}

/// Collects permission sets and validates them into a [`PermissionMatrix`]
#[derive(Debug, Default)]
pub struct MatrixBuilder {
    sets: HashMap<(Role, ActionKind), Vec<String>>,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the set for one (role, action) pair, replacing any previous one
    pub fn set<I, S>(mut self, role: Role, action: ActionKind, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .insert((role, action), entries.into_iter().map(Into::into).collect());
        self
    }

    /// Define all five sets of a role as `*`
    pub fn all(mut self, role: Role) -> Self {
        for action in ActionKind::ALL {
            self = self.set(role, action, [WILDCARD]);
        }
        self
    }

    /// Validate entries and the Role × ActionKind cross product
    pub fn build(self) -> Result<PermissionMatrix> {
        let mut parsed = HashMap::with_capacity(self.sets.len());
        for (key, entries) in self.sets {
            parsed.insert(key, PermissionSet::parse(entries)?);
        }

        for role in Role::ALL {
            for action in ActionKind::ALL {
                if !parsed.contains_key(&(role, action)) {
                    return Err(AuthzError::MissingMatrixEntry {
                        role: role.code().to_string(),
                        action,
                    });
                }
            }
        }

        let rows: Vec<[PermissionSet; 5]> = Role::ALL
            .iter()
            .map(|role| {
                std::array::from_fn(|i| {
                    parsed
                        .remove(&(*role, ActionKind::ALL[i]))
                        .unwrap_or_default()
                })
            })
            .collect();

        info!(
            "Permission matrix built: {} roles x {} actions",
            Role::ALL.len(),
            ActionKind::ALL.len()
        );

        Ok(PermissionMatrix { rows })
    }
}
