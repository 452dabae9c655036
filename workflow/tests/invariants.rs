//! Property tests: random navigation never breaks the stage invariants.

use proptest::prelude::*;
use workflow::{pipeline_from_names, WorkflowError, WorkflowState};

#[derive(Debug, Clone)]
enum Op {
    Advance,
    Retreat,
    Jump(u32),
    Finish,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Advance),
        2 => Just(Op::Retreat),
        2 => (0u32..12).prop_map(Op::Jump),
        1 => Just(Op::Finish),
    ]
}

fn pipeline(len: usize) -> WorkflowState {
    let names: Vec<String> = (1..=len).map(|i| format!("Stage {}", i)).collect();
    WorkflowState::initialize(pipeline_from_names(names), 1).unwrap()
}

fn apply(state: &WorkflowState, op: &Op) -> Result<WorkflowState, WorkflowError> {
    match op {
        Op::Advance => state.advance(),
        Op::Retreat => state.retreat(),
        Op::Jump(target) => state.jump_to(*target),
        Op::Finish => state.finish(),
    }
}

fn completed_prefix_is_unbroken(state: &WorkflowState) -> bool {
    let flags: Vec<bool> = state.stages().iter().map(|s| s.completed).collect();
    let prefix = flags.iter().take_while(|c| **c).count();
    flags[prefix..].iter().all(|c| !c)
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(
        len in 1usize..10,
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let mut state = pipeline(len);
        for op in &ops {
            let allowed = match op {
                Op::Advance => state.can_advance(),
                Op::Retreat => state.can_retreat(),
                Op::Jump(target) => state.can_jump_to(*target),
                Op::Finish => state.current_stage_id() == state.last_stage_id(),
            };
            match apply(&state, op) {
                Ok(next) => {
                    prop_assert!(allowed);
                    state = next;
                }
                Err(_) => {
                    prop_assert!(!allowed);
                }
            }
            prop_assert!(completed_prefix_is_unbroken(&state));
            prop_assert!(state.stage(state.current_stage_id()).is_some());
            let ids: Vec<u32> = state.stages().iter().map(|s| s.id).collect();
            prop_assert_eq!(ids, (1..=len as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn completion_is_one_way(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut state = pipeline(6);
        for op in &ops {
            if let Ok(next) = apply(&state, op) {
                prop_assert!(next.completed_count() >= state.completed_count());
                state = next;
            }
        }
    }

    #[test]
    fn jump_succeeds_iff_unlocked(
        ops in prop::collection::vec(arb_op(), 0..30),
        target in 1u32..10,
    ) {
        let mut state = pipeline(9);
        for op in &ops {
            if let Ok(next) = apply(&state, op) {
                state = next;
            }
        }

        let unlocked = target <= state.current_stage_id()
            || state.stage(target - 1).map(|s| s.completed).unwrap_or(false);
        match state.jump_to(target) {
            Ok(next) => {
                prop_assert!(unlocked);
                prop_assert_eq!(next.current_stage_id(), target);
                prop_assert_eq!(next.stages(), state.stages());
            }
            Err(err) => {
                prop_assert!(!unlocked);
                prop_assert_eq!(err, WorkflowError::StageLocked { target });
            }
        }
    }

    #[test]
    fn json_round_trip_preserves_state(ops in prop::collection::vec(arb_op(), 0..20)) {
        let mut state = pipeline(9);
        for op in &ops {
            if let Ok(next) = apply(&state, op) {
                state = next;
            }
        }
        let restored = WorkflowState::from_json(&state.to_json()).unwrap();
        prop_assert_eq!(restored, state);
    }
}
