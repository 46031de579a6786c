//! Access aggregation
//!
//! Combines the resolver's per-role verdicts into one answer for an identity.
//! The combination is a plain union: the identity has access when any held
//! role grants it, and an identity with no roles is always denied.

pub mod decision;

pub use decision::{AccessDecision, AccessRequest, DecisionReason};

use crate::error::Result;
use crate::identity::Identity;
use crate::matrix::{MatrixConfig, PermissionMatrix};
use crate::resolver::PolicyResolver;
use crate::types::{ActionKind, ResourceId};

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// JSON matrix replacing the built-in one
    pub matrix_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Read `AUTHZ_MATRIX_PATH` from the environment
    pub fn from_env() -> Self {
        Self {
            matrix_path: std::env::var_os("AUTHZ_MATRIX_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Access aggregator over a policy resolver
///
/// Holds no mutable state; one engine can serve any number of concurrent
/// callers.
#[derive(Debug, Clone, Default)]
pub struct AccessEngine {
    resolver: PolicyResolver,
}

impl AccessEngine {
    pub fn new(resolver: PolicyResolver) -> Self {
        Self { resolver }
    }

    /// Engine over the built-in matrix
    pub fn builtin() -> Self {
        Self::new(PolicyResolver::builtin())
    }

    /// Build the engine, loading and validating the configured matrix
    ///
    /// Any configuration error is returned here so startup can abort before
    /// the first request is served.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let resolver = match &config.matrix_path {
            Some(path) => {
                let matrix = MatrixConfig::from_file(path)?.into_matrix()?;
                info!("Using permission matrix from {}", path.display());
                PolicyResolver::new(Arc::new(matrix))
            }
            None => {
                info!("Using built-in permission matrix");
                PolicyResolver::builtin()
            }
        };
        Ok(Self::new(resolver))
    }

    pub fn resolver(&self) -> &PolicyResolver {
        &self.resolver
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        self.resolver.matrix()
    }

    /// Whether any role held by `identity` grants `action` on `resource`
    pub fn has_access(&self, identity: &Identity, action: ActionKind, resource: &str) -> bool {
        identity
            .roles()
            .any(|role| self.resolver.permits(role, action, resource))
    }

    /// Same as [`has_access`](Self::has_access); a missing identity holds no roles
    pub fn has_access_opt(
        &self,
        identity: Option<&Identity>,
        action: ActionKind,
        resource: &str,
    ) -> bool {
        identity.map_or(false, |identity| self.has_access(identity, action, resource))
    }

    /// Decision with the granting role, for display and logging
    pub fn decide(&self, identity: &Identity, action: ActionKind, resource: &str) -> AccessDecision {
        if !identity.is_authenticated() {
            debug!(%action, resource, "deny: unauthenticated");
            return AccessDecision::deny(action, resource, DecisionReason::Unauthenticated);
        }

        let granted = identity.roles().find_map(|role| {
            self.resolver
                .grant(role, action, resource)
                .map(|grant| (role, grant))
        });

        match granted {
            Some((role, grant)) => {
                debug!(%role, %action, resource, ?grant, "allow");
                AccessDecision::allow(action, resource, role, grant)
            }
            None => {
                debug!(roles = identity.role_count(), %action, resource, "deny: no matching grant");
                AccessDecision::deny(action, resource, DecisionReason::NoMatchingGrant)
            }
        }
    }

    /// Every action the identity may perform on `resource`
    pub fn permitted_actions(&self, identity: &Identity, resource: &str) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|action| self.has_access(identity, *action, resource))
            .collect()
    }

    /// Validate an untyped request, then decide
    ///
    /// Unknown role codes reject the request outright rather than being
    /// skipped, and malformed resource identifiers are rejected too.
    pub fn check_request(&self, request: &AccessRequest) -> Result<AccessDecision> {
        let identity = Identity::from_codes(&request.roles)?;
        let resource = ResourceId::parse(&request.resource)?;
        Ok(self.decide(&identity, request.action, resource.as_str()))
    }
}
