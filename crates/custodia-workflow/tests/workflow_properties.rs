//! Property tests for transition firing.

#![allow(clippy::unwrap_used)]

use custodia_workflow::{MachineCache, Transition, TransitionArgs, Workflow, WorkflowError};
use proptest::prelude::*;

const TRIGGERS: &[&str] = &["complete", "back_to_draft", "archive", "restore", "publish"];

#[derive(Default, Clone)]
struct Record {
    status: Option<String>,
    machine: MachineCache<Record>,
}

impl Workflow for Record {
    fn states() -> &'static [&'static str] {
        &["draft", "completed", "archived"]
    }

    fn initial_state() -> &'static str {
        "draft"
    }

    fn transitions() -> Vec<Transition<Self>> {
        vec![
            Transition::new("complete", ["draft"], "completed"),
            Transition::new("archive", ["draft", "completed"], "archived"),
            Transition::new("restore", ["archived"], "draft"),
            Transition::new("back_to_draft", ["completed"], "draft"),
        ]
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }

    fn machine_cache(&self) -> &MachineCache<Self> {
        &self.machine
    }
}

#[test]
fn test_complete_then_allowed_transitions() {
    let mut record = Record::default();
    record.fire("complete", TransitionArgs::new()).unwrap();
    let mut allowed = record.allowed_transitions();
    allowed.sort();
    assert_eq!(allowed, vec!["archive", "back_to_draft"]);
}

#[test]
fn test_complete_twice_fails() {
    let mut record = Record::default();
    record.fire("complete", TransitionArgs::new()).unwrap();
    let err = record.fire("complete", TransitionArgs::new()).unwrap_err();
    assert!(matches!(err, WorkflowError::IllegalTransition { ref state, .. } if state == "completed"));
    assert_eq!(record.current_state(), "completed");
}

#[test]
fn test_every_declared_edge_reaches_its_destination() {
    for transition in Record::transitions() {
        for source in transition.sources() {
            let mut record = Record {
                status: Some(source.clone()),
                ..Record::default()
            };
            record.fire(transition.trigger(), TransitionArgs::new()).unwrap();
            assert_eq!(record.current_state(), transition.dest());
        }
    }
}

#[test]
fn test_cloned_record_compiles_its_own_machine() {
    let record = Record::default();
    record.machine().unwrap();
    let copy = record.clone();
    assert!(!copy.machine_cache().is_compiled());
}

proptest! {
    #[test]
    fn prop_allowed_matches_fire(steps in proptest::collection::vec(0..TRIGGERS.len(), 0..24)) {
        let mut record = Record::default();
        for index in steps {
            let trigger = TRIGGERS[index];
            let before = record.current_state().to_string();
            let allowed = record.allowed_transitions().contains(&trigger.to_string());
            prop_assert_eq!(record.may(trigger), allowed);

            match record.fire(trigger, TransitionArgs::new()) {
                Ok(ctx) => {
                    prop_assert!(allowed);
                    prop_assert_eq!(ctx.source(), before.as_str());
                    prop_assert_eq!(record.current_state(), ctx.dest());
                }
                Err(err) => {
                    prop_assert!(!allowed);
                    prop_assert!(err.is_transition_rejection());
                    prop_assert_eq!(record.current_state(), before.as_str());
                }
            }
        }
    }

    #[test]
    fn prop_state_always_declared(steps in proptest::collection::vec(0..TRIGGERS.len(), 0..24)) {
        let mut record = Record::default();
        for index in steps {
            let _ = record.fire(TRIGGERS[index], TransitionArgs::new());
            prop_assert!(Record::states().contains(&record.current_state()));
        }
    }
}
