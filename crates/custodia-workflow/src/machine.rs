//! Compiled state machines.
//!
//! A [`StateMachine`] is the validated form of a workflow declaration:
//! an ordered state set, an initial state, and a transition table looked up
//! by trigger name.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{RejectReason, Result, WorkflowError};
use crate::transition::{Transition, TransitionArgs, TransitionContext};

/// A validated, table-driven state machine over entities of type `E`.
pub struct StateMachine<E> {
    states: Vec<String>,
    initial: String,
    transitions: Vec<Transition<E>>,
}

impl<E> StateMachine<E> {
    /// Validates a declaration and builds the machine.
    ///
    /// Fails with [`WorkflowError::InvalidDefinition`] if the state set is
    /// empty or has duplicates, if the initial state or any transition
    /// endpoint is undeclared, or if two transitions sharing a trigger can
    /// start from the same state.
    pub fn compile(
        states: &[&str],
        initial: &str,
        transitions: Vec<Transition<E>>,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(WorkflowError::invalid_definition("no states declared"));
        }

        let mut declared = BTreeSet::new();
        for state in states {
            if !declared.insert(*state) {
                return Err(WorkflowError::invalid_definition(format!(
                    "state '{state}' declared twice"
                )));
            }
        }

        if !declared.contains(initial) {
            return Err(WorkflowError::invalid_definition(format!(
                "initial state '{initial}' is not declared"
            )));
        }

        for (index, transition) in transitions.iter().enumerate() {
            let trigger = transition.trigger();
            if trigger.is_empty() {
                return Err(WorkflowError::invalid_definition(
                    "transition with an empty trigger",
                ));
            }
            if transition.sources().is_empty() {
                return Err(WorkflowError::invalid_definition(format!(
                    "transition '{trigger}' has no source states"
                )));
            }
            if let Some(source) = transition
                .sources()
                .iter()
                .find(|s| !declared.contains(s.as_str()))
            {
                return Err(WorkflowError::invalid_definition(format!(
                    "transition '{trigger}' starts from undeclared state '{source}'"
                )));
            }
            if !declared.contains(transition.dest()) {
                return Err(WorkflowError::invalid_definition(format!(
                    "transition '{trigger}' ends in undeclared state '{}'",
                    transition.dest()
                )));
            }

            let overlap = transitions[..index]
                .iter()
                .filter(|earlier| earlier.trigger() == trigger)
                .find_map(|earlier| earlier.sources().intersection(transition.sources()).next());
            if let Some(state) = overlap {
                return Err(WorkflowError::invalid_definition(format!(
                    "trigger '{trigger}' is declared twice from state '{state}'"
                )));
            }
        }

        tracing::debug!(
            states = states.len(),
            transitions = transitions.len(),
            initial,
            "Compiled state machine"
        );

        Ok(Self {
            states: states.iter().map(|s| (*s).to_string()).collect(),
            initial: initial.to_string(),
            transitions,
        })
    }

    /// The declared states, in declaration order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// The initial state.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// The transition table, in declaration order.
    pub fn transitions(&self) -> &[Transition<E>] {
        &self.transitions
    }

    /// Returns `true` if `state` is declared.
    pub fn is_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Every trigger name in the table.
    pub fn triggers(&self) -> BTreeSet<&str> {
        self.transitions.iter().map(Transition::trigger).collect()
    }

    /// Finds the transition `trigger` would take from `state`, ignoring
    /// guards.
    pub fn lookup(&self, trigger: &str, state: &str) -> Result<&Transition<E>> {
        if !self.is_state(state) {
            return Err(WorkflowError::UnknownState {
                state: state.to_string(),
            });
        }

        let mut known = false;
        for transition in self.transitions.iter().filter(|t| t.trigger() == trigger) {
            known = true;
            if transition.has_source(state) {
                return Ok(transition);
            }
        }

        if known {
            Err(WorkflowError::illegal(
                trigger,
                state,
                RejectReason::NotFromState,
            ))
        } else {
            Err(WorkflowError::UnknownTrigger {
                trigger: trigger.to_string(),
            })
        }
    }

    /// Finds the transition `trigger` would take from `state` and checks
    /// its guards against `entity`.
    ///
    /// Returns the transition together with the context its hooks receive.
    pub fn prepare(
        &self,
        entity: &E,
        trigger: &str,
        state: &str,
        args: TransitionArgs,
    ) -> Result<(&Transition<E>, TransitionContext)> {
        let transition = self.lookup(trigger, state)?;
        let ctx = TransitionContext::new(trigger, state, transition.dest(), args);
        transition
            .check_guards(entity, &ctx)
            .map_err(|reason| WorkflowError::illegal(trigger, state, reason))?;
        Ok((transition, ctx))
    }

    /// Triggers that would currently fire from `state`, in declaration
    /// order. Empty if `state` is undeclared.
    ///
    /// Guards see empty arguments; use [`allowed_with`](Self::allowed_with)
    /// when they read the arguments `fire` will be given.
    pub fn allowed(&self, entity: &E, state: &str) -> Vec<String> {
        self.allowed_with(entity, state, &TransitionArgs::new())
    }

    /// Like [`allowed`](Self::allowed), evaluating guards against `args`.
    pub fn allowed_with(&self, entity: &E, state: &str, args: &TransitionArgs) -> Vec<String> {
        if !self.is_state(state) {
            return Vec::new();
        }

        let mut allowed: Vec<String> = Vec::new();
        for transition in self.transitions.iter().filter(|t| t.has_source(state)) {
            let ctx = TransitionContext::new(
                transition.trigger(),
                state,
                transition.dest(),
                args.clone(),
            );
            if transition.check_guards(entity, &ctx).is_ok()
                && !allowed.iter().any(|t| t == transition.trigger())
            {
                allowed.push(transition.trigger().to_string());
            }
        }
        allowed
    }
}

impl<E> fmt::Debug for StateMachine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.states)
            .field("initial", &self.initial)
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// Per-instance slot holding a lazily compiled machine.
///
/// Cloning an entity must not share its machine, so cloning the cache yields
/// an empty one.
pub struct MachineCache<E>(OnceLock<Arc<StateMachine<E>>>);

impl<E> MachineCache<E> {
    /// An empty cache.
    pub fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns `true` once a machine has been compiled into this slot.
    pub fn is_compiled(&self) -> bool {
        self.0.get().is_some()
    }

    /// Returns the cached machine, compiling it on first access.
    pub fn get_or_compile(
        &self,
        compile: impl FnOnce() -> Result<StateMachine<E>>,
    ) -> Result<Arc<StateMachine<E>>> {
        if let Some(machine) = self.0.get() {
            return Ok(Arc::clone(machine));
        }
        let machine = Arc::new(compile()?);
        Ok(Arc::clone(self.0.get_or_init(|| machine)))
    }
}

impl<E> Default for MachineCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for MachineCache<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for MachineCache<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineCache")
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Doc {
        locked: bool,
    }

    const STATES: &[&str] = &["draft", "completed", "archived"];

    fn transitions() -> Vec<Transition<Doc>> {
        vec![
            Transition::new("complete", ["draft"], "completed"),
            Transition::new("back_to_draft", ["completed"], "draft"),
            Transition::new("archive", ["draft", "completed"], "archived").unless(|d: &Doc, _| d.locked),
            Transition::new("restore", ["archived"], "draft"),
        ]
    }

    fn machine() -> StateMachine<Doc> {
        StateMachine::compile(STATES, "draft", transitions()).unwrap()
    }

    #[test]
    fn test_compile_valid() {
        let machine = machine();
        assert_eq!(machine.states().len(), 3);
        assert_eq!(machine.initial(), "draft");
        assert_eq!(machine.triggers().len(), 4);
    }

    #[test]
    fn test_compile_rejects_empty_states() {
        let err = StateMachine::<Doc>::compile(&[], "draft", Vec::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_compile_rejects_duplicate_state() {
        let err = StateMachine::<Doc>::compile(&["a", "a"], "a", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_compile_rejects_undeclared_initial() {
        let err = StateMachine::<Doc>::compile(STATES, "new", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("initial state 'new'"));
    }

    #[test]
    fn test_compile_rejects_undeclared_endpoints() {
        let err = StateMachine::compile(
            STATES,
            "draft",
            vec![Transition::<Doc>::new("publish", ["draft"], "published")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("undeclared state 'published'"));

        let err = StateMachine::compile(
            STATES,
            "draft",
            vec![Transition::<Doc>::new("revive", ["deleted"], "draft")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("undeclared state 'deleted'"));
    }

    #[test]
    fn test_compile_rejects_overlapping_trigger() {
        let err = StateMachine::compile(
            STATES,
            "draft",
            vec![
                Transition::<Doc>::new("close", ["draft", "completed"], "archived"),
                Transition::<Doc>::new("close", ["completed"], "draft"),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("from state 'completed'"));
    }

    #[test]
    fn test_shared_trigger_with_disjoint_sources() {
        let machine = StateMachine::compile(
            STATES,
            "draft",
            vec![
                Transition::<Doc>::new("next", ["draft"], "completed"),
                Transition::<Doc>::new("next", ["completed"], "archived"),
            ],
        )
        .unwrap();
        assert_eq!(machine.lookup("next", "draft").unwrap().dest(), "completed");
        assert_eq!(machine.lookup("next", "completed").unwrap().dest(), "archived");
        assert!(matches!(
            machine.lookup("next", "archived"),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_lookup_distinguishes_unknown_trigger() {
        let machine = machine();
        assert!(matches!(
            machine.lookup("publish", "draft"),
            Err(WorkflowError::UnknownTrigger { .. })
        ));
        assert!(matches!(
            machine.lookup("restore", "draft"),
            Err(WorkflowError::IllegalTransition {
                reason: RejectReason::NotFromState,
                ..
            })
        ));
        assert!(matches!(
            machine.lookup("restore", "lost"),
            Err(WorkflowError::UnknownState { .. })
        ));
    }

    #[test]
    fn test_prepare_checks_guards() {
        let machine = machine();
        let locked = Doc { locked: true };
        let err = machine
            .prepare(&locked, "archive", "draft", TransitionArgs::new())
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::IllegalTransition {
                reason: RejectReason::UnlessMatched,
                ..
            }
        ));

        let (transition, ctx) = machine
            .prepare(&Doc { locked: false }, "archive", "completed", TransitionArgs::new())
            .unwrap();
        assert_eq!(transition.dest(), "archived");
        assert_eq!(ctx.source(), "completed");
    }

    #[test]
    fn test_allowed_respects_guards() {
        let machine = machine();
        assert_eq!(
            machine.allowed(&Doc { locked: false }, "completed"),
            vec!["back_to_draft", "archive"]
        );
        assert_eq!(
            machine.allowed(&Doc { locked: true }, "completed"),
            vec!["back_to_draft"]
        );
        assert!(machine.allowed(&Doc { locked: false }, "lost").is_empty());
    }

    #[test]
    fn test_cache_compiles_once() {
        let cache = MachineCache::new();
        assert!(!cache.is_compiled());
        let first = cache.get_or_compile(|| Ok(machine())).unwrap();
        let second = cache
            .get_or_compile(|| unreachable!("machine already compiled"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_failure_is_not_memoized() {
        let cache: MachineCache<Doc> = MachineCache::new();
        assert!(cache
            .get_or_compile(|| Err(WorkflowError::invalid_definition("broken")))
            .is_err());
        assert!(!cache.is_compiled());
    }

    #[test]
    fn test_cloned_cache_is_empty() {
        let cache = MachineCache::new();
        cache.get_or_compile(|| Ok(machine())).unwrap();
        assert!(!cache.clone().is_compiled());
    }
}
