//! Error types for the custodia command line.

use custodia_workflow::WorkflowError;

/// Errors a command can fail with.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CliError {
    /// Config loading or role parsing failed.
    #[error(transparent)]
    Core(#[from] custodia_core::Error),

    /// A workflow query was rejected.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Writing command output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result alias for command handlers.
pub type Result<T> = std::result::Result<T, CliError>;
