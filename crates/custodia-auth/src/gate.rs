//! The authorization gate.
//!
//! Every guarded entry point calls [`AuthorizationGate::authorize`] before
//! touching storage or a state machine.

use std::sync::Arc;

use custodia_acl::{Need, NeedSet, Operation, PermissionResolver};

use crate::error::AuthError;
use crate::principal::Principal;
use crate::scope::RequestScope;

/// Request-time authorization check backed by a shared resolver.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    resolver: Arc<PermissionResolver>,
}

impl AuthorizationGate {
    /// Create a gate over a shared resolver.
    pub fn new(resolver: Arc<PermissionResolver>) -> Self {
        Self { resolver }
    }

    /// The resolver the gate consults.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Check that the scope is authenticated and, if `required` is given,
    /// that the principal's needs satisfy it.
    ///
    /// The first call in a scope loads the principal's needs into it.
    pub fn authorize<'s>(
        &self,
        scope: &'s RequestScope,
        required: Option<&Operation>,
    ) -> Result<&'s Principal, AuthError> {
        let Some(principal) = scope.principal() else {
            log::debug!("Rejecting unauthenticated request");
            return Err(AuthError::Unauthenticated);
        };

        let needs = scope.needs_or_load(|| self.load_needs(principal));

        if let Some(operation) = required {
            if !operation.allows(needs) {
                log::warn!(
                    "Principal {} ({}) denied '{}'",
                    principal.id,
                    principal.role,
                    operation.permission()
                );
                return Err(AuthError::Forbidden {
                    permission: operation.permission().to_string(),
                });
            }
        }

        Ok(principal)
    }

    /// Non-failing form of [`authorize`](Self::authorize) with an operation.
    pub fn can(&self, scope: &RequestScope, operation: &Operation) -> bool {
        self.authorize(scope, Some(operation)).is_ok()
    }

    fn load_needs(&self, principal: &Principal) -> NeedSet {
        let mut needs = self.resolver.needs(principal.role);
        needs.insert(Need::Role(principal.role));
        log::debug!(
            "Loaded {} needs for principal {} ({})",
            needs.len(),
            principal.id,
            principal.role
        );
        needs
    }
}
