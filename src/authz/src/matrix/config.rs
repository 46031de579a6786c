//! JSON matrix configuration
//!
//! Deployments may replace the built-in matrix with a document of the form:
//!
//! ```json
//! {
//!   "roles": {
//!     "SINH_VIEN": {
//!       "view": ["SuKien"], "create": [], "edit": [], "delete": [], "approve": []
//!     }
//!   }
//! }
//! ```
//!
//! Every role of the catalog must appear and every role must list all five
//! actions, even as an empty array. Anything else is rejected before the
//! matrix is handed to a resolver.

use super::{MatrixBuilder, PermissionMatrix};
use crate::error::{AuthzError, Result};
use crate::role::Role;
use crate::types::ActionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Whole-matrix document keyed by role code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    pub roles: BTreeMap<String, ActionSetsConfig>,
}

/// The five action sets of one role; `None` means the key was absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve: Option<Vec<String>>,
}

impl ActionSetsConfig {
    pub fn get(&self, action: ActionKind) -> Option<&Vec<String>> {
        match action {
            ActionKind::View => self.view.as_ref(),
            ActionKind::Create => self.create.as_ref(),
            ActionKind::Edit => self.edit.as_ref(),
            ActionKind::Delete => self.delete.as_ref(),
            ActionKind::Approve => self.approve.as_ref(),
        }
    }

    fn slot(&mut self, action: ActionKind) -> &mut Option<Vec<String>> {
        match action {
            ActionKind::View => &mut self.view,
            ActionKind::Create => &mut self.create,
            ActionKind::Edit => &mut self.edit,
            ActionKind::Delete => &mut self.delete,
            ActionKind::Approve => &mut self.approve,
        }
    }
}

impl MatrixConfig {
    /// Parse a JSON document; structural mistakes become `InvalidConfig`
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AuthzError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a JSON document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        info!("Loading permission matrix from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Validate into an immutable matrix
    pub fn into_matrix(self) -> Result<PermissionMatrix> {
        let mut builder = MatrixBuilder::new();
        for (code, sets) in self.roles {
            let role: Role = code.parse()?;
            for action in ActionKind::ALL {
                if let Some(entries) = sets.get(action) {
                    builder = builder.set(role, action, entries.iter().cloned());
                }
            }
        }
        builder.build()
    }

    pub(super) fn from_matrix(matrix: &PermissionMatrix) -> Self {
        let roles = Role::ALL
            .iter()
            .map(|role| {
                let mut sets = ActionSetsConfig::default();
                for action in ActionKind::ALL {
                    *sets.slot(action) = Some(matrix.entry(*role, action).to_entries());
                }
                (role.code().to_string(), sets)
            })
            .collect();
        Self { roles }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_export_reloads_identically() {
        let matrix = PermissionMatrix::builtin().unwrap();
        let json = matrix.to_config().to_json_pretty().unwrap();
        let reloaded = MatrixConfig::from_json_str(&json)
            .unwrap()
            .into_matrix()
            .unwrap();
        assert_eq!(matrix, reloaded);
    }

    #[test]
    fn test_unknown_action_key() {
        let json = r#"{"roles": {"SINH_VIEN": {"view": [], "publish": []}}}"#;
        assert!(matches!(
            MatrixConfig::from_json_str(json),
            Err(AuthzError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_role_code() {
        let mut config = PermissionMatrix::builtin().unwrap().to_config();
        config.roles.insert("HIEU_TRUONG".to_string(), ActionSetsConfig::default());
        assert!(matches!(
            config.into_matrix(),
            Err(AuthzError::UnknownRole(code)) if code == "HIEU_TRUONG"
        ));
    }

    #[test]
    fn test_absent_action_is_missing_entry() {
        let mut config = PermissionMatrix::builtin().unwrap().to_config();
        if let Some(sets) = config.roles.get_mut("TRUONG_KHOA") {
            sets.approve = None;
        }
        assert!(matches!(
            config.into_matrix(),
            Err(AuthzError::MissingMatrixEntry { ref role, action: ActionKind::Approve }) if role == "TRUONG_KHOA"
        ));
    }
}
