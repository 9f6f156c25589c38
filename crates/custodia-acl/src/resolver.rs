//! Per-role permission resolution.
//!
//! The resolver turns the registered operation sets into a
//! `Role → (permission → needs)` table. The table is built once, on first
//! use, under a write lock; afterwards it is shared read-only behind an
//! `Arc`, so concurrent readers only take a brief read lock to clone it.
//!
//! When `always_rebuild` is enabled (development), the table is discarded
//! and rebuilt before every resolution. Rebuilds are serialized by the same
//! write lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use custodia_core::{PermissionsConfig, Role};

use crate::need::{NeedSet, Permission};
use crate::operations::HasOperations;
use crate::registry::OperationRegistry;

/// Mapping of permission name to the needs that satisfy it.
pub type Permissions = BTreeMap<Permission, NeedSet>;

/// The full `Role → Permissions` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap {
    by_role: BTreeMap<Role, Permissions>,
}

impl PermissionMap {
    /// Build the table from every registered operation set.
    ///
    /// A permission name declared by several sets merges its needs by union.
    pub fn build(registry: &OperationRegistry) -> Self {
        let mut by_role: BTreeMap<Role, Permissions> = BTreeMap::new();

        for set in registry.iter() {
            for operation in set.operations().iter() {
                for role in operation.roles() {
                    by_role
                        .entry(*role)
                        .or_default()
                        .entry(operation.permission().to_string())
                        .or_default()
                        .extend(operation.needs().iter().cloned());
                }
            }
        }

        Self { by_role }
    }

    /// The permissions granted to `role` directly, without the baseline.
    pub fn granted(&self, role: Role) -> Option<&Permissions> {
        self.by_role.get(&role)
    }

    /// The permissions `role` holds: its own grants merged with the
    /// baseline role's grants.
    pub fn resolve(&self, role: Role) -> Permissions {
        let mut permissions = self.by_role.get(&role).cloned().unwrap_or_default();

        if !role.is_baseline() {
            if let Some(baseline) = self.by_role.get(&Role::BASELINE) {
                for (permission, needs) in baseline {
                    permissions
                        .entry(permission.clone())
                        .or_default()
                        .extend(needs.iter().cloned());
                }
            }
        }

        permissions
    }
}

/// Caching resolver over an [`OperationRegistry`].
///
/// Safe to share across threads (`Arc<PermissionResolver>`).
pub struct PermissionResolver {
    registry: RwLock<OperationRegistry>,
    cache: RwLock<Option<Arc<PermissionMap>>>,
    always_rebuild: bool,
    builds: AtomicUsize,
}

impl PermissionResolver {
    /// Create a resolver. Nothing is built until the first resolution.
    pub fn new(registry: OperationRegistry, config: &PermissionsConfig) -> Self {
        Self {
            registry: RwLock::new(registry),
            cache: RwLock::new(None),
            always_rebuild: config.always_rebuild,
            builds: AtomicUsize::new(0),
        }
    }

    /// Whether the cache is rebuilt before every resolution.
    pub fn always_rebuild(&self) -> bool {
        self.always_rebuild
    }

    /// Register a further entity type after construction.
    ///
    /// The cached table does not change until it is rebuilt, which only
    /// happens in `always_rebuild` mode.
    pub fn register<T: HasOperations>(&self) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register::<T>();
    }

    /// Resolve the permissions held by `role`.
    pub fn resolve(&self, role: Role) -> Permissions {
        self.map().resolve(role)
    }

    /// Every need held by `role`, flattened across permissions.
    pub fn needs(&self, role: Role) -> NeedSet {
        self.resolve(role).into_values().flatten().collect()
    }

    /// The current permission table, building it if necessary.
    pub fn map(&self) -> Arc<PermissionMap> {
        if self.always_rebuild {
            return self.rebuild();
        }

        if let Some(map) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(map);
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built it while we waited for the lock.
        if let Some(map) = cache.as_ref() {
            return Arc::clone(map);
        }
        let map = Arc::new(self.build());
        *cache = Some(Arc::clone(&map));
        map
    }

    /// Drop the cached table.
    ///
    /// Only honoured in `always_rebuild` mode; otherwise the table is
    /// frozen and this returns `false`.
    pub fn invalidate(&self) -> bool {
        if !self.always_rebuild {
            log::debug!("Permission map invalidation ignored: always_rebuild is off");
            return false;
        }
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
        true
    }

    /// Number of times the table has been built.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn rebuild(&self) -> Arc<PermissionMap> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let map = Arc::new(self.build());
        *cache = Some(Arc::clone(&map));
        map
    }

    fn build(&self) -> PermissionMap {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let map = PermissionMap::build(&registry);
        let count = self.builds.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!(
            "Built permission map from {} operation sets (build #{count})",
            registry.len()
        );
        map
    }
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("always_rebuild", &self.always_rebuild)
            .field("builds", &self.build_count())
            .finish()
    }
}
