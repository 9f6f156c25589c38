#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia Workflow: finite-state machines bound to an entity's status.
//!
//! An entity implements [`Workflow`] by declaring its states, initial state
//! and [`Transition`] table. Triggers are dispatched by name through the
//! table; nothing is generated at runtime.
//!
//! - [`Workflow::fire`] moves the entity along one transition, running
//!   guards and hooks
//! - [`Workflow::begin`] does the same but defers the `after` hooks until
//!   the caller has persisted the change
//! - [`Workflow::allowed_transitions`] lists the triggers that would fire now
//! - [`StateMachine::compile`] validates a declaration up front

pub mod error;
pub mod machine;
pub mod transition;
pub mod workflow;

pub use error::{RejectReason, Result, WorkflowError};
pub use machine::{MachineCache, StateMachine};
pub use transition::{Guard, Hook, Transition, TransitionArgs, TransitionContext};
pub use workflow::{PendingTransition, Workflow};
