//! # Counter Demo
//!
//! A global counter store built on the tourkit architecture.
//!
//! The counter is a **pure state machine** with no side effects: a count
//! plus a status flag, mutated only through four named actions. All
//! effects return `Effect::None`, state changes are synchronous and
//! deterministic, and every operation is total.
//!
//! The two fields are orthogonal: count actions never touch the status,
//! and `SetStatus` never touches the count.
//!
//! ## Example
//!
//! ```no_run
//! use counter_demo::{CounterState, CounterAction, CounterReducer, CounterEnvironment};
//! use tourkit_runtime::Store;
//! use tourkit_testing::test_clock;
//!
//! # async fn example() {
//! let env = CounterEnvironment::new(test_clock());
//! let store = Store::new(CounterState::default(), CounterReducer::new(), env);
//!
//! let _ = store.send(CounterAction::Increment).await;
//! let count = store.state(|s| s.count).await;
//! assert_eq!(count, 1);
//! # }
//! ```

use tourkit_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Counter status flag
///
/// Orthogonal to the count: only `SetStatus` touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterStatus {
    /// Counter is actively in use
    Active,
    /// Counter has not been picked up yet (the starting status)
    #[default]
    Pending,
    /// Counter has been switched off
    Inactive,
}

impl std::fmt::Display for CounterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Pending => write!(f, "pending"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Counter state
///
/// Starts at `{count: 0, status: Pending}`. The count is unbounded in
/// both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
    /// Current status flag
    pub status: CounterStatus,
}

/// Counter actions
///
/// The only mutation surface of the store. Each action mutates exactly
/// one field.
#[derive(Debug, Clone)]
pub enum CounterAction {
    /// Increment the counter by 1
    Increment,
    /// Decrement the counter by 1
    Decrement,
    /// Reset the counter to 0 (status untouched)
    Reset,
    /// Set the status flag (count untouched)
    SetStatus(CounterStatus),
}

/// Counter environment
///
/// This demonstrates dependency injection. The clock is included for
/// demonstration purposes but not actually used since the counter is a
/// pure state machine.
#[derive(Debug, Clone)]
pub struct CounterEnvironment<C: Clock> {
    /// Clock for time-based operations (demonstration only)
    pub clock: C,
}

impl<C: Clock> CounterEnvironment<C> {
    /// Create a new counter environment with the given clock
    #[must_use]
    pub const fn new(clock: C) -> Self {
        Self { clock }
    }
}

/// Counter reducer
///
/// Implements the business logic for the counter: a pure function from
/// `(state, action)` to the new state. All four operations are total and
/// return no effects.
///
/// Generic over the Clock type C to work with any clock implementation.
#[derive(Debug, Clone, Copy)]
pub struct CounterReducer<C> {
    _phantom: std::marker::PhantomData<C>,
}

impl<C> CounterReducer<C> {
    /// Create a new counter reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<C> Default for CounterReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Reducer for CounterReducer<C> {
    type State = CounterState;
    type Action = CounterAction;
    type Environment = CounterEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _environment: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CounterAction::Increment => {
                state.count += 1;
            },
            CounterAction::Decrement => {
                state.count -= 1;
            },
            CounterAction::Reset => {
                state.count = 0;
            },
            CounterAction::SetStatus(status) => {
                state.status = status;
            },
        }

        // Pure state machine - no side effects
        smallvec![Effect::None]
    }
}
