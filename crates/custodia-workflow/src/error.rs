//! Error types for workflow transitions.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`WorkflowError`].
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Why an existing trigger was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RejectReason {
    /// No transition with the trigger has the current state as a source.
    NotFromState,

    /// A `conditions` guard returned `false`.
    ConditionFailed,

    /// An `unless` guard returned `true`.
    UnlessMatched,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotFromState => write!(f, "no transition from this state"),
            RejectReason::ConditionFailed => write!(f, "a condition was not met"),
            RejectReason::UnlessMatched => write!(f, "an unless guard matched"),
        }
    }
}

/// Errors raised while compiling or driving a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// No transition anywhere in the machine uses this trigger.
    #[error("unknown trigger '{trigger}'")]
    UnknownTrigger {
        /// The requested trigger.
        trigger: String,
    },

    /// The trigger exists but may not fire right now.
    #[error("transition '{trigger}' is not allowed from '{state}': {reason}")]
    IllegalTransition {
        /// The requested trigger.
        trigger: String,
        /// The state the entity was in.
        state: String,
        /// What refused it.
        reason: RejectReason,
    },

    /// The entity's stored status is not one of the declared states.
    #[error("state '{state}' is not declared by this workflow")]
    UnknownState {
        /// The offending status.
        state: String,
    },

    /// The declared states and transitions do not form a valid machine.
    #[error("invalid workflow definition: {message}")]
    InvalidDefinition {
        /// What is wrong with the declaration.
        message: String,
    },
}

impl WorkflowError {
    /// Creates an illegal-transition error.
    pub fn illegal(
        trigger: impl Into<String>,
        state: impl Into<String>,
        reason: RejectReason,
    ) -> Self {
        Self::IllegalTransition {
            trigger: trigger.into(),
            state: state.into(),
            reason,
        }
    }

    /// Creates an invalid-definition error.
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Returns `true` if a requested trigger was refused, either because it
    /// does not exist or because it may not fire from the current state.
    pub fn is_transition_rejection(&self) -> bool {
        matches!(
            self,
            WorkflowError::UnknownTrigger { .. } | WorkflowError::IllegalTransition { .. }
        )
    }

    /// Returns `true` if the caller can correct the request.
    pub fn is_client_error(&self) -> bool {
        self.is_transition_rejection()
    }

    /// Transition outcomes are deterministic; retrying never helps.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::illegal("complete", "completed", RejectReason::NotFromState);
        assert_eq!(
            err.to_string(),
            "transition 'complete' is not allowed from 'completed': no transition from this state"
        );

        let err = WorkflowError::UnknownTrigger {
            trigger: "publish".to_string(),
        };
        assert_eq!(err.to_string(), "unknown trigger 'publish'");
    }

    #[test]
    fn test_transition_rejections() {
        assert!(
            WorkflowError::UnknownTrigger {
                trigger: "x".into()
            }
            .is_transition_rejection()
        );
        assert!(
            WorkflowError::illegal("a", "b", RejectReason::ConditionFailed)
                .is_transition_rejection()
        );
        assert!(
            !WorkflowError::UnknownState {
                state: "lost".into()
            }
            .is_transition_rejection()
        );
        assert!(!WorkflowError::invalid_definition("empty").is_client_error());
    }

    #[test]
    fn test_never_retryable() {
        let errors = [
            WorkflowError::UnknownTrigger {
                trigger: "x".into(),
            },
            WorkflowError::illegal("a", "b", RejectReason::UnlessMatched),
            WorkflowError::UnknownState { state: "s".into() },
            WorkflowError::invalid_definition("bad"),
        ];
        assert!(errors.iter().all(|e| !e.is_retryable()));
    }
}
