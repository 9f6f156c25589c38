//! Authenticated principal identity.

use custodia_core::Role;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// The actor making a request, as established by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The principal's user id.
    pub id: u64,
    /// The principal's email address, used in audit lines.
    pub email: String,
    /// The principal's single role.
    pub role: Role,
}

impl Principal {
    /// Create a principal.
    pub fn new(id: u64, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Create a principal from a persisted integer role.
    ///
    /// Fails if `role` does not map to a known role.
    pub fn from_record(id: u64, email: impl Into<String>, role: i64) -> Result<Self, AuthError> {
        Ok(Self::new(id, email, Role::from_value(role)?))
    }
}
