//! Policy resolver
//!
//! Decides whether one role grants one action on one resource identifier.
//! A set containing `*` grants everything; otherwise the identifier must be
//! present verbatim. Field-scoped grants (`SuKien.TrangThaiSkID`) and
//! whole-resource grants (`SuKien`) are independent entries: neither implies
//! the other.

use crate::matrix::{default_matrix, Grant, PermissionMatrix};
use crate::role::Role;
use crate::types::ActionKind;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::trace;

/// Pure resolver over an immutable matrix
///
/// Cloning is cheap and clones share the matrix, so a resolver can be handed
/// to any number of threads without synchronization.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    matrix: Arc<PermissionMatrix>,
}

impl PolicyResolver {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    /// Resolver over the built-in matrix
    pub fn builtin() -> Self {
        Self::new(default_matrix())
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// How `role` is granted `action` on `resource`, if at all
    pub fn grant(&self, role: Role, action: ActionKind, resource: &str) -> Option<Grant> {
        let grant = self.matrix.entry(role, action).grant_for(resource);
        trace!(%role, %action, resource, ?grant, "resolved grant");
        grant
    }

    pub fn permits(&self, role: Role, action: ActionKind, resource: &str) -> bool {
        self.grant(role, action, resource).is_some()
    }

    pub fn can_view(&self, role: Role, resource: &str) -> bool {
        self.permits(role, ActionKind::View, resource)
    }

    pub fn can_create(&self, role: Role, resource: &str) -> bool {
        self.permits(role, ActionKind::Create, resource)
    }

    pub fn can_edit(&self, role: Role, resource: &str) -> bool {
        self.permits(role, ActionKind::Edit, resource)
    }

    pub fn can_delete(&self, role: Role, resource: &str) -> bool {
        self.permits(role, ActionKind::Delete, resource)
    }

    pub fn can_approve(&self, role: Role, resource: &str) -> bool {
        self.permits(role, ActionKind::Approve, resource)
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

static BUILTIN_RESOLVER: Lazy<PolicyResolver> = Lazy::new(PolicyResolver::builtin);

// Shorthands over the built-in matrix

pub fn permits(role: Role, action: ActionKind, resource: &str) -> bool {
    BUILTIN_RESOLVER.permits(role, action, resource)
}

pub fn can_view(role: Role, resource: &str) -> bool {
    permits(role, ActionKind::View, resource)
}

pub fn can_create(role: Role, resource: &str) -> bool {
    permits(role, ActionKind::Create, resource)
}

pub fn can_edit(role: Role, resource: &str) -> bool {
    permits(role, ActionKind::Edit, resource)
}

pub fn can_delete(role: Role, resource: &str) -> bool {
    permits(role, ActionKind::Delete, resource)
}

pub fn can_approve(role: Role, resource: &str) -> bool {
    permits(role, ActionKind::Approve, resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_wildcard() {
        let resolver = PolicyResolver::builtin();
        assert_eq!(
            resolver.grant(Role::SystemAdmin, ActionKind::Delete, "AnyResourceWhatsoever"),
            Some(Grant::Wildcard)
        );
        assert!(resolver.permits(Role::SystemAdmin, ActionKind::Approve, "SuKien.TrangThaiSkID"));
    }

    #[test]
    fn test_field_grant_does_not_imply_resource() {
        let resolver = PolicyResolver::builtin();
        assert!(resolver.can_edit(Role::SchoolBoardApprover, "SuKien.TrangThaiSkID"));
        assert!(!resolver.can_edit(Role::SchoolBoardApprover, "SuKien"));
    }

    #[test]
    fn test_resource_grant_does_not_imply_field() {
        let resolver = PolicyResolver::builtin();
        assert!(resolver.can_edit(Role::EventOrganizer, "SuKien"));
        assert!(!resolver.can_edit(Role::EventOrganizer, "SuKien.TrangThaiSkID"));
    }

    #[test]
    fn test_unparsed_input_simply_fails_to_match() {
        assert!(!can_view(Role::Student, ""));
        assert!(!can_view(Role::Student, "*"));
        assert!(!can_view(Role::Student, "sukien"));
    }

    #[test]
    fn test_shorthands_share_builtin_matrix() {
        assert!(std::ptr::eq(BUILTIN_RESOLVER.matrix(), default_matrix().as_ref()));
        assert!(permits(Role::FacilityManager, ActionKind::Approve, "YeuCauMuonPhong"));
    }

    #[test]
    fn test_shorthands_agree_with_resolver() {
        let resolver = PolicyResolver::default();
        for role in Role::ALL {
            for resource in ["SuKien", "YeuCauMuonPhong", "Phong", "SuKien.TrangThaiSkID"] {
                assert_eq!(can_view(role, resource), resolver.can_view(role, resource));
                assert_eq!(can_create(role, resource), resolver.can_create(role, resource));
                assert_eq!(can_edit(role, resource), resolver.can_edit(role, resource));
                assert_eq!(can_delete(role, resource), resolver.can_delete(role, resource));
                assert_eq!(can_approve(role, resource), resolver.can_approve(role, resource));
            }
        }
    }
}
