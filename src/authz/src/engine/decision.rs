//! Access decision types and request handling

use crate::matrix::Grant;
use crate::role::Role;
use crate::types::ActionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Untyped access request, as received from HTTP or another process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Role codes held by the caller; empty for anonymous callers
    #[serde(default)]
    pub roles: Vec<String>,

    /// Action being performed
    pub action: ActionKind,

    /// `Name` or `Name.Field`
    pub resource: String,
}

impl AccessRequest {
    pub fn new(
        roles: impl IntoIterator<Item = impl Into<String>>,
        action: ActionKind,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            action,
            resource: resource.into(),
        }
    }
}

/// Why access was granted or denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// A held role grants the action
    Granted,
    /// Roles were held but none grants the action
    NoMatchingGrant,
    /// No roles held
    Unauthenticated,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::Granted => write!(f, "granted by role"),
            DecisionReason::NoMatchingGrant => write!(f, "no held role grants this action"),
            DecisionReason::Unauthenticated => write!(f, "caller holds no roles"),
        }
    }
}

/// Access decision with the role and grant that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the request is allowed
    pub allowed: bool,

    pub action: ActionKind,

    pub resource: String,

    /// First role (in catalog order) granting the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<Role>,

    /// Wildcard or exact grant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant: Option<Grant>,

    pub reason: DecisionReason,
}

impl AccessDecision {
    /// Create an allow decision
    pub fn allow(action: ActionKind, resource: impl Into<String>, role: Role, grant: Grant) -> Self {
        Self {
            allowed: true,
            action,
            resource: resource.into(),
            granted_by: Some(role),
            grant: Some(grant),
            reason: DecisionReason::Granted,
        }
    }

    /// Create a deny decision
    pub fn deny(action: ActionKind, resource: impl Into<String>, reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            action,
            resource: resource.into(),
            granted_by: None,
            grant: None,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_decision() {
        let decision = AccessDecision::allow(ActionKind::Approve, "YeuCauMuonPhong", Role::FacilityManager, Grant::Exact);
        assert!(decision.allowed);
        assert_eq!(decision.granted_by, Some(Role::FacilityManager));
        assert_eq!(decision.reason, DecisionReason::Granted);
    }

    #[test]
    fn test_deny_decision_json() {
        let decision = AccessDecision::deny(ActionKind::Create, "SuKien", DecisionReason::NoMatchingGrant);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "allowed": false,
                "action": "create",
                "resource": "SuKien",
                "reason": "no_matching_grant"
            })
        );
    }

    #[test]
    fn test_request_defaults_to_no_roles() {
        let request: AccessRequest =
            serde_json::from_str(r#"{"action": "view", "resource": "SuKien"}"#).unwrap();
        assert!(request.roles.is_empty());
        assert_eq!(request.action, ActionKind::View);
    }
}
