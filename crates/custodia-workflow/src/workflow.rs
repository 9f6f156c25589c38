//! The [`Workflow`] trait: a state machine bound to one status field.

use std::sync::Arc;

use crate::error::{Result, WorkflowError};
use crate::machine::{MachineCache, StateMachine};
use crate::transition::{Transition, TransitionArgs, TransitionContext};

/// Implemented by entities whose `status` field is driven by a state
/// machine.
///
/// The implementor declares the states, the initial state, and the
/// transition table; the provided methods do the rest. The compiled machine
/// lives in the instance's [`MachineCache`] and is built on first use.
///
/// # Example
///
/// ```rust
/// use custodia_workflow::{MachineCache, Transition, TransitionArgs, Workflow};
///
/// #[derive(Default)]
/// struct Ticket {
///     status: Option<String>,
///     machine: MachineCache<Ticket>,
/// }
///
/// impl Workflow for Ticket {
///     fn states() -> &'static [&'static str] {
///         &["open", "closed"]
///     }
///     fn initial_state() -> &'static str {
///         "open"
///     }
///     fn transitions() -> Vec<Transition<Self>> {
///         vec![
///             Transition::new("close", ["open"], "closed"),
///             Transition::new("reopen", ["closed"], "open"),
///         ]
///     }
///     fn status(&self) -> Option<&str> {
///         self.status.as_deref()
///     }
///     fn set_status(&mut self, status: String) {
///         self.status = Some(status);
///     }
///     fn machine_cache(&self) -> &MachineCache<Self> {
///         &self.machine
///     }
/// }
///
/// let mut ticket = Ticket::default();
/// assert_eq!(ticket.current_state(), "open");
/// ticket.fire("close", TransitionArgs::new()).unwrap();
/// assert_eq!(ticket.allowed_transitions(), vec!["reopen"]);
/// ```
pub trait Workflow: Sized + 'static {
    /// The declared states, in order.
    fn states() -> &'static [&'static str];

    /// The state a new entity starts in.
    fn initial_state() -> &'static str;

    /// The transition table.
    fn transitions() -> Vec<Transition<Self>>;

    /// The persisted status, if set.
    fn status(&self) -> Option<&str>;

    /// Writes the status field.
    fn set_status(&mut self, status: String);

    /// The per-instance machine slot.
    fn machine_cache(&self) -> &MachineCache<Self>;

    /// The compiled machine for this instance.
    fn machine(&self) -> Result<Arc<StateMachine<Self>>> {
        self.machine_cache().get_or_compile(|| {
            StateMachine::compile(Self::states(), Self::initial_state(), Self::transitions())
        })
    }

    /// The persisted status, or the initial state when unset.
    fn current_state(&self) -> &str {
        self.status().unwrap_or(Self::initial_state())
    }

    /// Fires `trigger` from the current state.
    ///
    /// On success the status equals the transition's destination; `before`
    /// hooks ran before the change and `after` hooks after it, each once and
    /// in declaration order. On failure the status is untouched and no hook
    /// ran. Returns the context the hooks received.
    fn fire(&mut self, trigger: &str, args: TransitionArgs) -> Result<TransitionContext> {
        let pending = self.begin(trigger, args)?;
        Ok(pending.finish(self))
    }

    /// First half of [`fire`](Self::fire): checks guards, runs the `before`
    /// hooks and moves the status, but holds the `after` hooks back.
    ///
    /// Callers that persist the entity finish the transition only once the
    /// write has committed. Dropping the pending transition skips the
    /// `after` hooks.
    fn begin(&mut self, trigger: &str, args: TransitionArgs) -> Result<PendingTransition<Self>> {
        let machine = self.machine()?;
        let state = self.current_state().to_string();

        let (transition, ctx) = match machine.prepare(self, trigger, &state, args) {
            Ok(prepared) => prepared,
            Err(err) => {
                tracing::debug!(trigger, state = %state, error = %err, "Transition refused");
                return Err(err);
            }
        };
        let transition = transition.clone();

        transition.run_before(self, &ctx);
        self.set_status(ctx.dest().to_string());
        Ok(PendingTransition { transition, ctx })
    }

    /// Triggers that [`fire`](Self::fire) would currently accept, in
    /// declaration order.
    fn allowed_transitions(&self) -> Vec<String> {
        self.allowed_transitions_with(&TransitionArgs::new())
    }

    /// Like [`allowed_transitions`](Self::allowed_transitions), with guards
    /// evaluated against `args`.
    fn allowed_transitions_with(&self, args: &TransitionArgs) -> Vec<String> {
        match self.machine() {
            Ok(machine) => machine.allowed_with(self, self.current_state(), args),
            Err(err) => {
                tracing::warn!(error = %err, "Workflow definition does not compile");
                Vec::new()
            }
        }
    }

    /// Returns `true` if `trigger` would currently fire.
    fn may(&self, trigger: &str) -> bool {
        self.machine()
            .and_then(|machine| {
                machine
                    .prepare(self, trigger, self.current_state(), TransitionArgs::new())
                    .map(|_| ())
            })
            .is_ok()
    }

    /// Checks that the current state is declared.
    fn check_state(&self) -> Result<()> {
        let machine = self.machine()?;
        let state = self.current_state();
        if machine.is_state(state) {
            Ok(())
        } else {
            Err(WorkflowError::UnknownState {
                state: state.to_string(),
            })
        }
    }
}

/// A transition whose status change is done but whose `after` hooks have
/// not run yet. Returned by [`Workflow::begin`].
#[must_use = "the after hooks only run when the transition is finished"]
pub struct PendingTransition<E> {
    transition: Transition<E>,
    ctx: TransitionContext,
}

impl<E> PendingTransition<E> {
    /// The context the hooks receive.
    pub fn context(&self) -> &TransitionContext {
        &self.ctx
    }

    /// Runs the `after` hooks against `entity` and returns the context.
    pub fn finish(self, entity: &E) -> TransitionContext {
        self.transition.run_after(entity, &self.ctx);
        tracing::debug!(
            trigger = %self.ctx.trigger(),
            from = %self.ctx.source(),
            to = %self.ctx.dest(),
            "Transition fired"
        );
        self.ctx
    }
}

impl<E> std::fmt::Debug for PendingTransition<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransition")
            .field("ctx", &self.ctx)
            .finish()
    }
}
