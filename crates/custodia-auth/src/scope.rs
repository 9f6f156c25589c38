//! Per-request authorization scope.

use std::sync::OnceLock;

use custodia_acl::NeedSet;

use crate::principal::Principal;

/// State carried by one request: the principal, if any, and the needs it
/// provides once they have been loaded.
///
/// The needs are loaded on the first authorization in the scope; later
/// checks in the same scope reuse them.
#[derive(Debug, Default)]
pub struct RequestScope {
    principal: Option<Principal>,
    needs: OnceLock<NeedSet>,
}

impl RequestScope {
    /// A scope with no principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A scope for an authenticated principal.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            needs: OnceLock::new(),
        }
    }

    /// The principal, if the request is authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Whether a principal is attached.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The loaded needs, or `None` before the first authorization.
    pub fn needs(&self) -> Option<&NeedSet> {
        self.needs.get()
    }

    /// The actor label for audit lines: the principal's email, or `anonymous`.
    pub fn actor<'a>(&'a self, anonymous: &'a str) -> &'a str {
        self.principal
            .as_ref()
            .map(|p| p.email.as_str())
            .unwrap_or(anonymous)
    }

    pub(crate) fn needs_or_load(&self, load: impl FnOnce() -> NeedSet) -> &NeedSet {
        self.needs.get_or_init(load)
    }
}
