//! Creation and modification times maintained by the lifecycle manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `created_at` / `updated_at` for one entity.
///
/// Stamped by [`EntityManager`](crate::EntityManager) on save and rendered
/// in response bodies. Both fields are output only: deserializing an
/// entity never reads them from input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// When the entity was first stored.
    #[serde(default, skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the entity was last stored.
    #[serde(default, skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Both fields set to `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(at),
            updated_at: Some(at),
        }
    }

    /// Stamps a first write: both fields become `now`.
    pub fn mark_created(&mut self, now: DateTime<Utc>) {
        *self = Self::at(now);
    }

    /// Stamps a later write: only `updated_at` moves.
    pub fn mark_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
