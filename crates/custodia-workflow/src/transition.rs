//! Transition declarations and the context handed to their hooks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RejectReason;

/// A guard predicate (`conditions` / `unless`).
///
/// Guards receive the arguments passed to the trigger. Listing allowed
/// transitions evaluates them against whatever arguments the caller
/// supplies there, empty by default, so a guard that reads arguments can
/// only agree with `fire` when both see the same ones.
pub type Guard<E> = Arc<dyn Fn(&E, &TransitionContext) -> bool + Send + Sync>;

/// A side-effect hook (`before` / `after`).
pub type Hook<E> = Arc<dyn Fn(&E, &TransitionContext) + Send + Sync>;

/// Free-form keyword arguments supplied by whoever fires a trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionArgs(BTreeMap<String, Value>);

impl TransitionArgs {
    /// Empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up an argument.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a string argument.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns `true` if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What guards and hooks see about the transition in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionContext {
    trigger: String,
    source: String,
    dest: String,
    args: TransitionArgs,
}

impl TransitionContext {
    pub(crate) fn new(
        trigger: impl Into<String>,
        source: impl Into<String>,
        dest: impl Into<String>,
        args: TransitionArgs,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            source: source.into(),
            dest: dest.into(),
            args,
        }
    }

    /// The trigger being fired.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// The state before the transition.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The state after the transition.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The caller's arguments.
    pub fn args(&self) -> &TransitionArgs {
        &self.args
    }

    /// Shorthand for a string argument.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get_str(key)
    }
}

/// One edge of a state machine.
///
/// # Example
///
/// ```rust
/// use custodia_workflow::Transition;
///
/// struct Doc;
///
/// let archive: Transition<Doc> = Transition::new("archive", ["draft", "completed"], "archived")
///     .after(|_doc, ctx| println!("archived from {}", ctx.source()));
/// assert!(archive.has_source("completed"));
/// ```
pub struct Transition<E> {
    trigger: String,
    sources: BTreeSet<String>,
    dest: String,
    conditions: Vec<Guard<E>>,
    unless: Vec<Guard<E>>,
    before: Vec<Hook<E>>,
    after: Vec<Hook<E>>,
}

impl<E> Transition<E> {
    /// Declares `trigger` moving any of `sources` to `dest`.
    pub fn new<S: Into<String>>(
        trigger: impl Into<String>,
        sources: impl IntoIterator<Item = S>,
        dest: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            dest: dest.into(),
            conditions: Vec::new(),
            unless: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Adds a guard that must return `true`.
    pub fn condition(
        mut self,
        guard: impl Fn(&E, &TransitionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.conditions.push(Arc::new(guard));
        self
    }

    /// Adds a guard that must return `false`.
    pub fn unless(
        mut self,
        guard: impl Fn(&E, &TransitionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.unless.push(Arc::new(guard));
        self
    }

    /// Adds a hook run before the status changes.
    pub fn before(mut self, hook: impl Fn(&E, &TransitionContext) + Send + Sync + 'static) -> Self {
        self.before.push(Arc::new(hook));
        self
    }

    /// Adds a hook run after the status changes.
    pub fn after(mut self, hook: impl Fn(&E, &TransitionContext) + Send + Sync + 'static) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    /// The trigger name.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// The source states.
    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    /// The destination state.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Returns `true` if the transition may start from `state`.
    pub fn has_source(&self, state: &str) -> bool {
        self.sources.contains(state)
    }

    pub(crate) fn check_guards(
        &self,
        entity: &E,
        ctx: &TransitionContext,
    ) -> Result<(), RejectReason> {
        if !self.conditions.iter().all(|guard| guard(entity, ctx)) {
            return Err(RejectReason::ConditionFailed);
        }
        if self.unless.iter().any(|guard| guard(entity, ctx)) {
            return Err(RejectReason::UnlessMatched);
        }
        Ok(())
    }

    pub(crate) fn run_before(&self, entity: &E, ctx: &TransitionContext) {
        for hook in &self.before {
            hook(entity, ctx);
        }
    }

    pub(crate) fn run_after(&self, entity: &E, ctx: &TransitionContext) {
        for hook in &self.after {
            hook(entity, ctx);
        }
    }
}

impl<E> Clone for Transition<E> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
            sources: self.sources.clone(),
            dest: self.dest.clone(),
            conditions: self.conditions.clone(),
            unless: self.unless.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl<E> fmt::Debug for Transition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("trigger", &self.trigger)
            .field("sources", &self.sources)
            .field("dest", &self.dest)
            .field("conditions", &self.conditions.len())
            .field("unless", &self.unless.len())
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
