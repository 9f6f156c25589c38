//! # custodia-acl
//!
//! Capability-based access control for Custodia.
//!
//! - [`Operation`]: a named capability requirement ("create projects") and
//!   the roles it is granted to
//! - [`EntityOperations`]: the fixed operation set one entity type declares
//! - [`OperationRegistry`]: explicit startup registry of every operation set
//! - [`PermissionResolver`]: per-role `permission → needs` map, built once
//!   and cached for the process lifetime
//!
//! ```rust
//! use std::sync::LazyLock;
//! use custodia_acl::{EntityOperations, HasOperations, OperationRegistry, PermissionResolver};
//! use custodia_core::{PermissionsConfig, Role};
//!
//! struct Note;
//!
//! static NOTE_OPERATIONS: LazyLock<EntityOperations> = LazyLock::new(|| {
//!     let mut ops = EntityOperations::new("notes");
//!     ops.viewed.grant([Role::Authenticated]);
//!     ops.edited.grant([Role::Admin]);
//!     ops
//! });
//!
//! impl HasOperations for Note {
//!     const ENTITY: &'static str = "Note";
//!     type Operations = EntityOperations;
//!
//!     fn can_be() -> &'static EntityOperations {
//!         &NOTE_OPERATIONS
//!     }
//! }
//!
//! let registry = OperationRegistry::new().with::<Note>();
//! let resolver = PermissionResolver::new(registry, &PermissionsConfig::default());
//! assert!(resolver.resolve(Role::Scientist).contains_key("view notes"));
//! assert!(!resolver.resolve(Role::Scientist).contains_key("edit notes"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod need;
pub mod operation;
pub mod operations;
pub mod registry;
pub mod resolver;

pub use need::{Need, NeedSet, Permission};
pub use operation::Operation;
pub use operations::{EntityOperations, HasOperations, OperationSet};
pub use registry::{OperationRegistry, RegisteredSet};
pub use resolver::{PermissionMap, PermissionResolver, Permissions};
