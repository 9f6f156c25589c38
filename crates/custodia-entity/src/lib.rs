#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia Entity: lifecycle orchestration for persisted records.
//!
//! The core does not own storage. An [`EntityStore`] is the narrow contract
//! to the persistence layer; [`EntityManager`] wraps every write in
//! validate, stage, commit (or roll back), then audit.
//!
//! # Modules
//!
//! - [`entity`]: the [`Entity`] and [`EntityStore`] contracts
//! - [`manager`]: save / delete / fetch orchestration
//! - [`audit`]: audit line formatting and sinks
//! - [`memory`]: a transactional in-memory store
//! - [`timestamps`]: `created_at` / `updated_at` stamped on save
//! - [`error`]: [`EntityError`], [`StorageError`], [`ValidationErrors`]

pub mod audit;
pub mod entity;
pub mod error;
pub mod manager;
pub mod memory;
pub mod timestamps;

pub use audit::{
    AUDIT_TARGET, AuditAction, AuditSink, MemoryAuditSink, TracingAuditSink, audit_line, format_label,
};
pub use entity::{Entity, EntityStore};
pub use error::{EntityError, Result, StorageError, ValidationErrors};
pub use manager::EntityManager;
pub use memory::{CallCounts, FailPoint, MemoryStore};
pub use timestamps::Timestamps;
