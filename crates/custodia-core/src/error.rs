//! Error types for custodia-core.

use std::path::{Path, PathBuf};

/// Errors that can occur in custodia-core.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value does not map to any known role.
    #[error("Invalid role: {value}")]
    InvalidRole {
        /// The offending value, as given
        value: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error while reading or writing a file
    #[error("I/O error{}: {source}", path_suffix(.path))]
    Io {
        /// Path involved in the failed operation, if known
        path: Option<PathBuf>,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

/// Convenience `Result` type alias for custodia-core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new invalid-role error.
    pub fn invalid_role<S: ToString>(value: S) -> Self {
        Error::InvalidRole {
            value: value.to_string(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error together with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: Some(path.to_path_buf()),
            source,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { path: None, source }
    }
}
