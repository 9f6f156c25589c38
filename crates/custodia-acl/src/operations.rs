//! Operation sets: the fixed operations one entity type declares.

use crate::operation::Operation;

/// A fixed, enumerable collection of operations owned by one entity type.
///
/// Implementations must keep their shape stable for the life of the process:
/// the permission resolver caches permission names taken from them.
pub trait OperationSet: Send + Sync {
    /// Iterates every operation in the set, in declaration order.
    fn iter(&self) -> Box<dyn Iterator<Item = &Operation> + '_>;

    /// Looks up an operation by its key (e.g. `"edited"`) or permission name.
    fn operation(&self, key: &str) -> Option<&Operation>;

    /// Number of operations in the set.
    fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if the set holds no operations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Implemented by entity types that gate their actions on operations.
///
/// The set is reached through a type-level handle, so callers can write
/// `Project::can_be().edited` without an instance.
pub trait HasOperations {
    /// Entity type name, also the registry key.
    const ENTITY: &'static str;

    /// The concrete operation set type.
    type Operations: OperationSet + 'static;

    /// The operation set shared by every instance of the type.
    fn can_be() -> &'static Self::Operations;
}

/// The well-known entity operations: view, edit, create, delete.
///
/// Permission names are derived from a slug, e.g. `"projects"` yields
/// `view projects`, `edit projects`, `create projects`, `delete projects`.
/// Further operations can be appended with [`with_operation`](Self::with_operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOperations {
    /// Reading an entity.
    pub viewed: Operation,
    /// Updating an entity.
    pub edited: Operation,
    /// Creating an entity.
    pub created: Operation,
    /// Deleting an entity.
    pub deleted: Operation,
    slug: String,
    extra: Vec<(String, Operation)>,
}

impl EntityOperations {
    /// Creates the four standard operations for `slug`, granted to nobody.
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            viewed: Operation::new(format!("view {slug}")),
            edited: Operation::new(format!("edit {slug}")),
            created: Operation::new(format!("create {slug}")),
            deleted: Operation::new(format!("delete {slug}")),
            slug,
            extra: Vec::new(),
        }
    }

    /// Appends a further named operation.
    pub fn with_operation(mut self, key: impl Into<String>, operation: Operation) -> Self {
        self.extra.push((key.into(), operation));
        self
    }

    /// The slug permission names were derived from.
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl OperationSet for EntityOperations {
    fn iter(&self) -> Box<dyn Iterator<Item = &Operation> + '_> {
        let standard = [&self.viewed, &self.edited, &self.created, &self.deleted];
        Box::new(
            standard
                .into_iter()
                .chain(self.extra.iter().map(|(_, op)| op)),
        )
    }

    fn operation(&self, key: &str) -> Option<&Operation> {
        match key {
            "viewed" => Some(&self.viewed),
            "edited" => Some(&self.edited),
            "created" => Some(&self.created),
            "deleted" => Some(&self.deleted),
            _ => self
                .extra
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, op)| op)
                .or_else(|| self.iter().find(|op| op.permission() == key)),
        }
    }
}
