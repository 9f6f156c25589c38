//! The role registry.
//!
//! Roles are a closed, integer-backed enumeration fixed at build time. The
//! values are unique and contiguous starting at 1; a const assertion below
//! rejects any edit that breaks this.
//!
//! [`Role::Authenticated`] is the baseline: every principal holds it
//! implicitly, so its grants are merged into every other role's grants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A principal's fixed authorization level.
///
/// Ordered by value: `Admin < Scientist < Authenticated`.
///
/// Serialized as its integer value, matching how roles are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(u8)]
pub enum Role {
    /// Full administrative access.
    Admin = 1,
    /// Domain user able to author records.
    Scientist = 2,
    /// Baseline role held by every signed-in principal.
    Authenticated = 3,
}

impl Role {
    /// Every role, in ascending value order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Scientist, Role::Authenticated];

    /// The role whose grants every other role inherits.
    pub const BASELINE: Role = Role::Authenticated;

    /// Returns the integer value backing this role.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Looks up a role by its integer value.
    ///
    /// # Examples
    ///
    /// ```
    /// use custodia_core::Role;
    ///
    /// assert_eq!(Role::from_value(2).unwrap(), Role::Scientist);
    /// assert!(Role::from_value(9).is_err());
    /// ```
    pub fn from_value(value: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|role| i64::from(role.value()) == value)
            .ok_or_else(|| Error::invalid_role(value))
    }

    /// Returns the lowercase role name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Scientist => "scientist",
            Role::Authenticated => "authenticated",
        }
    }

    /// Returns `true` for the baseline role.
    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }
}

// Unique and contiguous from 1. Sorted + contiguous implies unique.
const _: () = {
    let mut i = 0;
    while i < Role::ALL.len() {
        assert!(Role::ALL[i] as usize == i + 1);
        i += 1;
    }
};

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Role {
    type Err = Error;

    /// Accepts either the role name (case-insensitive) or its integer value.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::from_value(value);
        }
        Self::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::invalid_role(trimmed))
    }
}

impl TryFrom<i64> for Role {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        i64::from(role.value())
    }
}
