#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia Core: shared roles, errors, and configuration.
//!
//! This crate has no internal Custodia dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`role`]: The closed, totally ordered set of principal roles
//! - [`config`]: TOML-backed runtime configuration

pub mod config;
pub mod error;
pub mod role;

// Re-export key types at crate root for convenience
pub use config::{AuditConfig, CustodiaConfig, LoggingConfig, PermissionsConfig};
pub use error::{Error, Result};
pub use role::Role;
