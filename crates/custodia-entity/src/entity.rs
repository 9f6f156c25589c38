//! The entity contract and the storage collaborator contract.

use crate::error::{StorageError, ValidationErrors};
use crate::timestamps::Timestamps;

/// A persisted record the lifecycle manager can save, delete, and audit.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Type name used in audit lines and errors, e.g. `"Project"`.
    const TYPE_NAME: &'static str;

    /// Primary key, `None` until first stored.
    fn id(&self) -> Option<u64>;

    /// Assigns the primary key. Called by stores.
    fn set_id(&mut self, id: u64);

    /// Human-readable label for audit lines. Need not be unique.
    fn label(&self) -> String;

    /// Creation and modification times.
    fn timestamps(&self) -> &Timestamps;

    /// Mutable access for the lifecycle manager's stamping.
    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Schema validation, run before every save.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// The external persistence collaborator.
///
/// Writes are staged until [`commit`](Self::commit); on any failure the
/// caller invokes [`rollback`](Self::rollback), which must discard every
/// staged write.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Loads the committed entity stored under `key`.
    fn fetch_by_key(&self, key: u64) -> Result<Option<E>, StorageError>;

    /// Stages an insert or update. Assigns a key to new entities.
    fn add(&self, entity: &mut E) -> Result<(), StorageError>;

    /// Stages a deletion.
    fn delete(&self, entity: &E) -> Result<(), StorageError>;

    /// Makes staged writes durable.
    fn commit(&self) -> Result<(), StorageError>;

    /// Discards staged writes.
    fn rollback(&self);
}
