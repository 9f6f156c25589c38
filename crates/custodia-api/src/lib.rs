#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia API: request-level orchestration.
//!
//! An [`EntityResource`] serves one entity type. Each handler authorizes
//! through the [`AuthorizationGate`](custodia_auth::AuthorizationGate)
//! first, then fetches, acts, and answers with an [`ApiResponse`] or an
//! [`ApiError`]. Both render as JSON HTTP responses through axum's
//! [`IntoResponse`](axum::response::IntoResponse).
//!
//! Routing and request decoding belong to the embedding server.

pub mod error;
pub mod resource;

pub use error::{ACCESS_DENIED, ApiError, INTERNAL_ERROR, Result, TRANSITION_NOT_ALLOWED};
pub use resource::{ApiResponse, EntityResource, Resource};
