//! Explicit registry of entity operation sets.
//!
//! Every entity type that participates in authorization is registered here
//! once at startup. The permission resolver enumerates the registry instead
//! of discovering operation sets on its own.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = OperationRegistry::new()
//!     .with::<Project>()
//!     .with::<User>();
//!
//! assert_eq!(registry.len(), 2);
//! ```

use crate::operation::Operation;
use crate::operations::{HasOperations, OperationSet};

/// One registered operation set and the entity type it belongs to.
#[derive(Clone, Copy)]
pub struct RegisteredSet {
    entity: &'static str,
    operations: &'static dyn OperationSet,
}

impl RegisteredSet {
    /// The entity type name.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// The entity's operation set.
    pub fn operations(&self) -> &'static dyn OperationSet {
        self.operations
    }
}

impl std::fmt::Debug for RegisteredSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSet")
            .field("entity", &self.entity)
            .field("operations", &self.operations.len())
            .finish()
    }
}

/// The entity-type registry.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    sets: Vec<RegisteredSet>,
}

impl OperationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { sets: Vec::new() }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T: HasOperations>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Register the operation set of entity type `T`.
    pub fn register<T: HasOperations>(&mut self) -> &mut Self {
        self.register_set(T::ENTITY, T::can_be())
    }

    /// Register an operation set under an entity name.
    ///
    /// Registering the same set twice is a no-op. A different set under an
    /// already registered name is ignored with a warning.
    pub fn register_set(
        &mut self,
        entity: &'static str,
        operations: &'static dyn OperationSet,
    ) -> &mut Self {
        match self.sets.iter().find(|set| set.entity == entity) {
            Some(existing) if std::ptr::addr_eq(existing.operations, operations) => {
                log::debug!("Operation set for '{entity}' already registered");
            }
            Some(_) => {
                log::warn!("Ignoring second operation set registered for '{entity}'");
            }
            None => {
                log::debug!(
                    "Registered {} operations for '{entity}'",
                    operations.len()
                );
                self.sets.push(RegisteredSet { entity, operations });
            }
        }
        self
    }

    /// Iterate the registered sets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredSet> {
        self.sets.iter()
    }

    /// Look up the operation set of an entity type.
    pub fn get(&self, entity: &str) -> Option<&'static dyn OperationSet> {
        self.sets
            .iter()
            .find(|set| set.entity == entity)
            .map(|set| set.operations)
    }

    /// Resolve `entity.can_be.<key>`, e.g. `("Project", "edited")`.
    pub fn operation(&self, entity: &str, key: &str) -> Option<&'static Operation> {
        self.get(entity).and_then(|ops| ops.operation(key))
    }

    /// Registered entity names.
    pub fn entities(&self) -> Vec<&'static str> {
        self.sets.iter().map(|set| set.entity).collect()
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
