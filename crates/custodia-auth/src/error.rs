//! Auth-specific error types.

/// Errors returned by the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No principal is attached to the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal lacks the required operation grant.
    #[error("access denied: missing permission '{permission}'")]
    Forbidden {
        /// The permission that was required.
        permission: String,
    },

    /// The principal record cannot be turned into a valid principal.
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),
}

impl AuthError {
    /// Whether this error is caused by the caller (vs. the server).
    pub fn is_client_error(&self) -> bool {
        matches!(self, AuthError::Unauthenticated | AuthError::Forbidden { .. })
    }

    /// Authorization outcomes are deterministic; retrying never helps.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<custodia_core::Error> for AuthError {
    fn from(err: custodia_core::Error) -> Self {
        AuthError::InvalidPrincipal(err.to_string())
    }
}
