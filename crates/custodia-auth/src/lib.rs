#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Request-time authorization for Custodia.
//!
//! Provides:
//! - [`Principal`]: the authenticated actor behind a request
//! - [`RequestScope`]: per-request state holding the principal and its
//!   lazily loaded needs
//! - [`AuthorizationGate`]: the check every guarded entry point runs first
//! - [`AuthError`]: `Unauthenticated` / `Forbidden`

mod error;
mod gate;
mod principal;
mod scope;

pub use error::AuthError;
pub use gate::AuthorizationGate;
pub use principal::Principal;
pub use scope::RequestScope;
