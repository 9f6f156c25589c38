#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia Models: the reference entity types.
//!
//! - [`Project`]: authored records with a status workflow
//! - [`User`]: stored principals
//!
//! Both expose their operation sets through [`HasOperations`]. Call
//! [`registry`] once at startup to register them with the permission
//! resolver.

pub mod project;
pub mod user;

use custodia_acl::{HasOperations, OperationRegistry};

pub use project::{ACTOR_ARG, ORIGINAL_STATUS_ARG, Project, ProjectStatus};
pub use user::{InvalidUserStatus, User, UserStatus};

/// An operation registry holding every entity type in this crate.
pub fn registry() -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    register_all(&mut registry);
    registry
}

/// Registers every entity type in this crate with `registry`.
pub fn register_all(registry: &mut OperationRegistry) {
    registry.register::<Project>().register::<User>();
    tracing::debug!(
        entities = ?[Project::ENTITY, User::ENTITY],
        "Registered model operation sets"
    );
}
