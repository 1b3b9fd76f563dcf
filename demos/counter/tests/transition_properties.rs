//! Property tests for counter state transitions
//!
//! The reducer is a pure function, so properties run on it directly
//! without a store or an async runtime.

use counter_demo::{CounterAction, CounterEnvironment, CounterReducer, CounterState, CounterStatus};
use proptest::prelude::*;
use tourkit_core::reducer::Reducer;
use tourkit_testing::{FixedClock, test_clock};

fn status_strategy() -> impl Strategy<Value = CounterStatus> {
    prop_oneof![
        Just(CounterStatus::Active),
        Just(CounterStatus::Pending),
        Just(CounterStatus::Inactive),
    ]
}

fn action_strategy() -> impl Strategy<Value = CounterAction> {
    prop_oneof![
        Just(CounterAction::Increment),
        Just(CounterAction::Decrement),
        Just(CounterAction::Reset),
        status_strategy().prop_map(CounterAction::SetStatus),
    ]
}

fn apply(state: &mut CounterState, action: CounterAction) {
    let reducer: CounterReducer<FixedClock> = CounterReducer::new();
    let env = CounterEnvironment::new(test_clock());
    let _ = reducer.reduce(state, action, &env);
}

proptest! {
    /// Count actions never touch the status, and SetStatus never touches
    /// the count: each operation mutates exactly one field.
    #[test]
    fn operations_mutate_exactly_one_field(
        count in -1000i64..1000,
        status in status_strategy(),
        action in action_strategy(),
    ) {
        let mut state = CounterState { count, status };
        apply(&mut state, action.clone());

        match action {
            CounterAction::SetStatus(s) => {
                prop_assert_eq!(state.count, count);
                prop_assert_eq!(state.status, s);
            }
            CounterAction::Increment => {
                prop_assert_eq!(state.count, count + 1);
                prop_assert_eq!(state.status, status);
            }
            CounterAction::Decrement => {
                prop_assert_eq!(state.count, count - 1);
                prop_assert_eq!(state.status, status);
            }
            CounterAction::Reset => {
                prop_assert_eq!(state.count, 0);
                prop_assert_eq!(state.status, status);
            }
        }
    }

    /// Reset is idempotent and always lands on zero, whatever came before.
    #[test]
    fn reset_is_absorbing_for_count(
        actions in prop::collection::vec(action_strategy(), 0..20),
    ) {
        let mut state = CounterState::default();
        for action in actions {
            apply(&mut state, action);
        }

        apply(&mut state, CounterAction::Reset);
        prop_assert_eq!(state.count, 0);
        apply(&mut state, CounterAction::Reset);
        prop_assert_eq!(state.count, 0);
    }

    /// The count after any sequence equals increments minus decrements
    /// since the last reset: no other path mutates it.
    #[test]
    fn count_is_determined_by_the_operation_log(
        actions in prop::collection::vec(action_strategy(), 0..50),
    ) {
        let mut state = CounterState::default();
        let mut expected = 0i64;

        for action in actions {
            match action {
                CounterAction::Increment => expected += 1,
                CounterAction::Decrement => expected -= 1,
                CounterAction::Reset => expected = 0,
                CounterAction::SetStatus(_) => {},
            }
            apply(&mut state, action);
        }

        prop_assert_eq!(state.count, expected);
    }
}
