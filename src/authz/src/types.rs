//! Core authorization types

use crate::error::{AuthzError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved token granting every resource for one (role, action) pair
pub const WILDCARD: &str = "*";

static RESOURCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("resource identifier pattern is valid")
});

/// Action being authorized
///
/// Serialized as the lowercase name; parsing (including deserialization)
/// ignores case and reports anything else as [`AuthzError::UnknownAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionKind {
    View,
    Create,
    Edit,
    Delete,
    Approve,
}

impl ActionKind {
    /// Every action, in matrix column order
    pub const ALL: [ActionKind; 5] = [
        ActionKind::View,
        ActionKind::Create,
        ActionKind::Edit,
        ActionKind::Delete,
        ActionKind::Approve,
    ];

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::View => "view",
            ActionKind::Create => "create",
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
            ActionKind::Approve => "approve",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ActionKind::View => 0,
            ActionKind::Create => 1,
            ActionKind::Edit => 2,
            ActionKind::Delete => 3,
            ActionKind::Approve => 4,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        ActionKind::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
    }
}

impl TryFrom<String> for ActionKind {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        value.as_str().to_string()
    }
}

/// Classification attached to every role (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "NHAN_VIEN")]
    Staff,
    #[serde(rename = "GIANG_VIEN")]
    Lecturer,
    #[serde(rename = "SINH_VIEN")]
    Student,
}

impl UserType {
    pub fn code(&self) -> &'static str {
        match self {
            UserType::Staff => "NHAN_VIEN",
            UserType::Lecturer => "GIANG_VIEN",
            UserType::Student => "SINH_VIEN",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validated resource identifier: `Name` or `Name.Field`
///
/// The resolver compares identifiers as opaque strings, so this type is
/// only needed where identifiers arrive from outside (HTTP, config).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Parse and validate an identifier
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == WILDCARD {
            return Err(AuthzError::InvalidResource(
                "'*' is reserved for permission sets".to_string(),
            ));
        }

        if !RESOURCE_PATTERN.is_match(raw) {
            return Err(AuthzError::InvalidResource(format!(
                "'{}' must be 'Name' or 'Name.Field'",
                raw
            )));
        }

        Ok(Self(raw.to_string()))
    }

    /// Build a field-scoped identifier such as `SuKien.TrangThaiSkID`
    pub fn field_of(resource: &str, field: &str) -> Result<Self> {
        Self::parse(&format!("{}.{}", resource, field))
    }

    /// Resource name without the field part
    pub fn resource(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Field name, if this identifier is field-scoped
    pub fn field(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, field)| field)
    }

    pub fn is_field_scoped(&self) -> bool {
        self.field().is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceId {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!("view".parse::<ActionKind>().unwrap(), ActionKind::View);
        assert_eq!("Approve".parse::<ActionKind>().unwrap(), ActionKind::Approve);
        assert!(matches!(
            "publish".parse::<ActionKind>(),
            Err(AuthzError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_action_serde_matches_parsing() {
        let action: ActionKind = serde_json::from_str("\"Approve\"").unwrap();
        assert_eq!(action, ActionKind::Approve);
        assert_eq!(serde_json::to_string(&ActionKind::Edit).unwrap(), "\"edit\"");

        let err = serde_json::from_str::<ActionKind>("\"publish\"").unwrap_err();
        assert!(err.to_string().contains("Unknown action: publish"), "{}", err);
    }

    #[test]
    fn test_action_indices_follow_all() {
        for (idx, action) in ActionKind::ALL.iter().enumerate() {
            assert_eq!(action.index(), idx);
        }
    }

    #[test]
    fn test_resource_shapes() {
        let whole = ResourceId::parse("SuKien").unwrap();
        assert_eq!(whole.resource(), "SuKien");
        assert_eq!(whole.field(), None);

        let field = ResourceId::parse("SuKien.TrangThaiSkID").unwrap();
        assert_eq!(field.resource(), "SuKien");
        assert_eq!(field.field(), Some("TrangThaiSkID"));
        assert!(field.is_field_scoped());

        assert_eq!(
            ResourceId::field_of("YeuCauMuonPhong", "TrangThaiYcID").unwrap().as_str(),
            "YeuCauMuonPhong.TrangThaiYcID"
        );
    }

    #[test]
    fn test_resource_rejects_malformed() {
        for raw in ["", "*", "SuKien.", ".Field", "A.B.C", "Su Kien", "SuKien.*"] {
            assert!(
                matches!(ResourceId::parse(raw), Err(AuthzError::InvalidResource(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_resource_serde() {
        let id: ResourceId = serde_json::from_str("\"Phong\"").unwrap();
        assert_eq!(id.as_str(), "Phong");
        assert!(serde_json::from_str::<ResourceId>("\"*\"").is_err());
    }
}
