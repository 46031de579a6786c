//! # Campus Events Authorization Engine
//!
//! Role-based access control for the campus events platform: decides whether
//! an identity may view, create, edit, delete or approve a resource, or a
//! single field of a resource.
//!
//! ## Features
//!
//! - **Closed role catalog** with stable wire codes and user types
//! - **Validated permission matrix**: every role defines all five action
//!   sets, checked once before first use
//! - **Field-scoped grants** independent of whole-resource grants
//! - **Union aggregation** over all roles of an identity, fail-closed when
//!   the identity holds none
//! - **Lock-free**: the matrix is immutable and shared, checks never block
//! - **Session persistence port** kept outside the decision path
//!
//! ## Example
//!
//! ```rust
//! use campus_authz::{AccessEngine, ActionKind, Identity, Role};
//!
//! let engine = AccessEngine::builtin();
//! let approver = Identity::new([Role::SchoolBoardApprover]);
//!
//! // The board may set the status field of an event...
//! assert!(engine.has_access(&approver, ActionKind::Edit, "SuKien.TrangThaiSkID"));
//! // ...but not edit the event itself.
//! assert!(!engine.has_access(&approver, ActionKind::Edit, "SuKien"));
//!
//! // Nobody gets anything without a role.
//! assert!(!engine.has_access(&Identity::anonymous(), ActionKind::View, "SuKien"));
//! ```

pub mod engine;
pub mod error;
pub mod identity;
pub mod matrix;
pub mod resolver;
pub mod role;
pub mod types;

// Re-export commonly used types
pub use engine::{AccessDecision, AccessEngine, AccessRequest, DecisionReason, EngineConfig};
pub use error::{AuthzError, Result};
pub use identity::{Identity, IdentityState, Session, SessionStore};
pub use matrix::{Grant, MatrixConfig, PermissionMatrix, PermissionSet};
pub use resolver::{can_approve, can_create, can_delete, can_edit, can_view, permits, PolicyResolver};
pub use role::{user_type_of, Role};
pub use types::{ActionKind, ResourceId, UserType, WILDCARD};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
