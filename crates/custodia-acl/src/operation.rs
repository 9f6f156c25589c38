//! A single capability requirement.

use std::collections::BTreeSet;
use std::fmt;

use custodia_core::Role;

use crate::need::{Need, NeedSet, Permission};

/// A named capability requirement plus the roles it is granted to.
///
/// Operations are populated once at startup via [`Operation::grant`] and
/// read-only afterwards. Whether an operation passes for a principal is
/// derived, never stored.
///
/// # Example
///
/// ```rust
/// use custodia_acl::Operation;
/// use custodia_core::Role;
///
/// let op = Operation::new("delete projects").granted_to([Role::Admin]);
/// assert!(op.evaluate(Role::Admin));
/// assert!(!op.evaluate(Role::Scientist));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    permission: Permission,
    needs: NeedSet,
    roles: BTreeSet<Role>,
}

impl Operation {
    /// Creates an operation with an empty role set.
    pub fn new(permission: impl Into<Permission>) -> Self {
        let permission = permission.into();
        let needs = NeedSet::from([Need::Action(permission.clone())]);
        Self {
            permission,
            needs,
            roles: BTreeSet::new(),
        }
    }

    /// Grants the operation to `roles`. Granting a role twice is a no-op.
    pub fn grant(&mut self, roles: impl IntoIterator<Item = Role>) -> &mut Self {
        self.roles.extend(roles);
        self
    }

    /// Builder form of [`grant`](Self::grant).
    pub fn granted_to(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.grant(roles);
        self
    }

    /// The permission name.
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// The roles this operation is granted to directly.
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// The needs this operation resolves to.
    pub fn needs(&self) -> &NeedSet {
        &self.needs
    }

    /// Returns `true` if `role` may perform this operation.
    ///
    /// A grant to the baseline role reaches every role.
    pub fn evaluate(&self, role: Role) -> bool {
        self.roles.contains(&role) || self.roles.contains(&Role::BASELINE)
    }

    /// Returns `true` if any of this operation's needs is in `provided`.
    pub fn allows(&self, provided: &NeedSet) -> bool {
        self.needs.iter().any(|need| provided.contains(need))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.permission)
    }
}
