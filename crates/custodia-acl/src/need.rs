//! Needs: the atomic permission tokens operations resolve to.

use std::collections::BTreeSet;
use std::fmt;

use custodia_core::Role;
use serde::{Deserialize, Serialize};

/// A human-readable permission name, e.g. `"view projects"`.
///
/// The same string names the same permission across entity types.
pub type Permission = String;

/// An ordered set of needs.
pub type NeedSet = BTreeSet<Need>;

/// The underlying token a principal must provide for an operation to pass.
///
/// A principal's request identity provides its role need plus the action
/// needs of every permission its role resolves to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Need {
    /// Holding a specific role.
    Role(Role),
    /// Being allowed a named action.
    Action(Permission),
}

impl Need {
    /// Creates an action need.
    pub fn action(permission: impl Into<Permission>) -> Self {
        Need::Action(permission.into())
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Need::Role(role) => write!(f, "role:{role}"),
            Need::Action(permission) => write!(f, "action:{permission}"),
        }
    }
}
