//! Users: principals as stored records.

use std::sync::LazyLock;

use custodia_acl::{EntityOperations, HasOperations};
use custodia_auth::Principal;
use custodia_core::Role;
use custodia_entity::{Entity, Timestamps, ValidationErrors};
use serde::{Deserialize, Serialize};
use thiserror::Error;

static OPERATIONS: LazyLock<EntityOperations> = LazyLock::new(|| {
    let mut ops = EntityOperations::new("users");
    ops.created.grant([Role::Admin]);
    ops.viewed.grant([Role::Admin]);
    ops.edited.grant([Role::Admin]);
    ops.deleted.grant([Role::Admin]);
    ops
});

/// Returned when a stored integer is not a [`UserStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid user status: {0}")]
pub struct InvalidUserStatus(pub i64);

/// Whether a user may sign in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum UserStatus {
    /// Sign-in refused.
    Blocked = 0,
    /// Normal account.
    #[default]
    Active = 1,
}

impl TryFrom<i64> for UserStatus {
    type Error = InvalidUserStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserStatus::Blocked),
            1 => Ok(UserStatus::Active),
            other => Err(InvalidUserStatus(other)),
        }
    }
}

impl From<UserStatus> for i64 {
    fn from(status: UserStatus) -> Self {
        status as i64
    }
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    #[serde(default)]
    pub id: Option<u64>,

    /// Display name, filled in on sign-in.
    #[serde(default)]
    pub name: Option<String>,

    /// Email address, also the audit label.
    pub email: String,

    /// Authorization role.
    #[serde(default = "default_role")]
    pub role: Role,

    /// Account status.
    #[serde(default)]
    pub status: UserStatus,

    /// Creation and modification times.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

fn default_role() -> Role {
    Role::BASELINE
}

impl User {
    /// A new active user with the baseline role.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            email: email.into(),
            role: default_role(),
            status: UserStatus::Active,
            timestamps: Timestamps::default(),
        }
    }

    /// Builder: set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if the account is active.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// The principal this user signs in as.
    ///
    /// `None` for users that were never stored or are blocked.
    pub fn principal(&self) -> Option<Principal> {
        match self.id {
            Some(id) if self.is_active() => Some(Principal::new(id, self.email.clone(), self.role)),
            _ => None,
        }
    }
}

impl HasOperations for User {
    const ENTITY: &'static str = "User";
    type Operations = EntityOperations;

    fn can_be() -> &'static EntityOperations {
        &OPERATIONS
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn label(&self) -> String {
        self.email.clone()
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                errors.add("email", "Not a valid email address.");
            }
        }
        errors.into_result()
    }
}
