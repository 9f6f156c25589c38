//! Runtime configuration.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields [`CustodiaConfig::default`].
//!
//! # Path resolution
//!
//! 1. An explicit path passed by the caller (must exist)
//! 2. The `CUSTODIA_CONFIG` environment variable (must exist)
//! 3. `<config dir>/custodia/config.toml` (optional)
//!
//! # Example
//!
//! ```rust
//! use custodia_core::CustodiaConfig;
//!
//! let config = CustodiaConfig::from_toml_str(
//!     r#"
//!     [permissions]
//!     always_rebuild = true
//!     "#,
//! )
//! .unwrap();
//! assert!(config.permissions.always_rebuild);
//! assert_eq!(config.logging.level, "info");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level Custodia configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodiaConfig {
    /// Permission resolution settings.
    pub permissions: PermissionsConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Audit trail settings.
    pub audit: AuditConfig,
}

/// Permission resolver settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Rebuild the permission map before every resolution.
    ///
    /// Meant for development, when operation sets are edited while the
    /// process is running. Leave off in production.
    pub always_rebuild: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Audit trail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Emit audit lines for entity changes.
    pub enabled: bool,

    /// Actor label used when no principal is attached to a change.
    pub anonymous_actor: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            anonymous_actor: default_anonymous_actor(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_anonymous_actor() -> String {
    "Anonymous User".to_string()
}

impl CustodiaConfig {
    /// Environment variable naming a config file.
    pub const ENV_VAR: &'static str = "CUSTODIA_CONFIG";

    /// Project name, used for the config directory.
    pub const PROJECT_NAME: &'static str = "custodia";

    /// The platform default config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::PROJECT_NAME).join("config.toml"))
    }

    /// Resolve which config file would be read.
    ///
    /// Returns the path and whether it is required to exist.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<(PathBuf, bool)> {
        if let Some(path) = explicit {
            return Some((PathBuf::from(path), true));
        }
        if let Some(path) = std::env::var_os(Self::ENV_VAR) {
            return Some((PathBuf::from(path), true));
        }
        Self::default_config_path().map(|path| (path, false))
    }

    /// Load the configuration following the path resolution order.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some((path, required)) => {
                if path.exists() {
                    Self::from_file(&path)
                } else if required {
                    Err(Error::config(format!(
                        "Config file does not exist at {}",
                        path.display()
                    )))
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
            None => Ok(Self::default()),
        }
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render the config as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| Error::io_with_path(e, path))
    }
}
