//! Error types for the authorization engine
//!
//! Only parsing and configuration boundaries produce errors. Permission
//! checks themselves always answer with a plain `bool`.

use crate::types::ActionKind;
use thiserror::Error;

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Role code outside the closed catalog
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Action name outside View/Create/Edit/Delete/Approve
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A (role, action) pair has no permission set
    #[error("Missing matrix entry for role {role} and action {action}")]
    MissingMatrixEntry { role: String, action: ActionKind },

    /// Resource identifier is not `Name` or `Name.Field`
    #[error("Invalid resource identifier: {0}")]
    InvalidResource(String),

    /// Malformed permission matrix configuration
    #[error("Invalid matrix configuration: {0}")]
    InvalidConfig(String),

    /// Session store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthzError {
    /// True for errors caused by caller input rather than deployment state
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthzError::UnknownRole(_) | AuthzError::UnknownAction(_) | AuthzError::InvalidResource(_)
        )
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
