//! Entity lifecycle orchestration.
//!
//! [`EntityManager`] ties validation, the storage transaction, and the audit
//! line together. Storage itself is delegated to an [`EntityStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use custodia_core::AuditConfig;

use crate::audit::{AuditAction, AuditSink, audit_line};
use crate::entity::{Entity, EntityStore};
use crate::error::{EntityError, Result, StorageError};

/// Save / delete / fetch for one entity type.
pub struct EntityManager<E, S> {
    store: Arc<S>,
    audit: Arc<dyn AuditSink>,
    config: AuditConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> EntityManager<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    /// Creates a manager over `store`, writing audit lines to `audit`.
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>, config: AuditConfig) -> Self {
        Self {
            store,
            audit,
            config,
            _entity: PhantomData,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The label used when no actor is given.
    pub fn anonymous_actor(&self) -> &str {
        &self.config.anonymous_actor
    }

    /// Loads the entity stored under `key`.
    pub fn get(&self, key: u64) -> Result<Option<E>> {
        Ok(self.store.fetch_by_key(key)?)
    }

    /// Loads the entity stored under `key`, or fails with
    /// [`EntityError::NotFound`].
    pub fn get_or_not_found(&self, key: u64) -> Result<E> {
        self.get(key)?.ok_or(EntityError::NotFound {
            entity: E::TYPE_NAME,
            key,
        })
    }

    /// Validates and persists `entity`, then records
    /// `... has been created|updated by <actor>`.
    ///
    /// `created` is chosen when the entity had no key before the call.
    /// A new entity gets both timestamps; an existing one only a fresh
    /// `updated_at`.
    pub fn save(&self, entity: &mut E, actor: Option<&str>) -> Result<()> {
        let action = if entity.id().is_some() {
            AuditAction::Updated
        } else {
            AuditAction::Created
        };
        self.persist(entity)?;
        self.audit(entity, action, actor);
        Ok(())
    }

    /// Like [`save`](Self::save) but without an audit line.
    ///
    /// Used after a workflow transition whose hook already logged.
    pub fn save_quiet(&self, entity: &mut E) -> Result<()> {
        self.persist(entity)
    }

    /// Deletes `entity` and records `... has been deleted by <actor>`.
    pub fn delete(&self, entity: &E, actor: Option<&str>) -> Result<()> {
        self.transact(|store| store.delete(entity))?;
        self.audit(entity, AuditAction::Deleted, actor);
        Ok(())
    }

    /// Writes a stamped copy of `entity` and adopts it only once the
    /// commit succeeded. On failure `entity` keeps its key and timestamps.
    fn persist(&self, entity: &mut E) -> Result<()> {
        entity.validate().map_err(EntityError::Validation)?;

        let mut staged = entity.clone();
        let now = Utc::now();
        if staged.id().is_none() {
            staged.timestamps_mut().mark_created(now);
        } else {
            staged.timestamps_mut().mark_updated(now);
        }

        self.transact(|store| store.add(&mut staged))?;
        *entity = staged;
        Ok(())
    }

    /// Runs one staged write and commits it. On any failure the store is
    /// rolled back and the error returned unchanged.
    fn transact(
        &self,
        write: impl FnOnce(&S) -> std::result::Result<(), StorageError>,
    ) -> std::result::Result<(), StorageError> {
        let outcome = write(self.store.as_ref()).and_then(|()| self.store.commit());
        if let Err(err) = &outcome {
            tracing::error!(entity = E::TYPE_NAME, error = %err, "Storage failed, rolling back");
            self.store.rollback();
        }
        outcome
    }

    fn audit(&self, entity: &E, action: AuditAction, actor: Option<&str>) {
        if !self.config.enabled {
            return;
        }
        let actor = actor.unwrap_or(&self.config.anonymous_actor);
        self.audit.record(&audit_line(
            E::TYPE_NAME,
            &entity.label(),
            entity.id(),
            action,
            actor,
        ));
    }
}

impl<E, S> Clone for EntityManager<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: Arc::clone(&self.audit),
            config: self.config.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, S> std::fmt::Debug for EntityManager<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("audit_enabled", &self.config.enabled)
            .finish()
    }
}
