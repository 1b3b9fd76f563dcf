//! # Tours Demo
//!
//! The remote tour fetcher built on the tourkit architecture.
//!
//! A consumer dispatches `FetchRequested`; the reducer flips the view
//! state to `Loading` and returns a cancellable fetch effect. The effect
//! resolves to exactly one terminal action, `ToursLoaded` or
//! `FetchFailed`, so the view state is always exactly one of
//! loading / failed / loaded.
//!
//! Retry is caller-initiated: re-send `FetchRequested` from a terminal
//! state. A `FetchRequested` while already loading restarts the fetch;
//! the last resolution wins.
//!
//! The consumer owns the [`CancellationToken`] in the environment and
//! signals it on teardown: a resolution that races with cancellation is
//! discarded by the runtime and never mutates state.
//!
//! [`CancellationToken`]: tourkit_core::effect::CancellationToken

use std::sync::Arc;

use tourkit_catalog::{Tour, TourSource};
use tourkit_core::{
    SmallVec,
    effect::{CancellationToken, Effect},
    environment::Clock,
    reducer::Reducer,
    smallvec,
};

/// View state of the remote batch
///
/// Exactly one variant at a time. `Loading` always precedes the first
/// resolution; `Failed` and `Loaded` are terminal until the next fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemoteData {
    /// No fetch has been requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch failed; holds the user-visible message
    Failed(String),
    /// The last fetch succeeded; holds the validated batch in server order
    Loaded(Vec<Tour>),
}

impl RemoteData {
    /// Whether a fetch is currently in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the last fetch has resolved (successfully or not)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Loaded(_))
    }
}

/// Tours feature state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToursState {
    /// Current view state of the remote batch
    pub remote: RemoteData,
}

/// Tours actions
#[derive(Debug, Clone)]
pub enum ToursAction {
    /// Consumer asked for (or retried) a fetch
    FetchRequested,
    /// The fetch resolved with a validated batch
    ToursLoaded(Vec<Tour>),
    /// The fetch resolved with an error; holds the user-visible message
    FetchFailed(String),
}

/// Tours environment
///
/// Holds the injected tour source, the consumer-owned cancellation token,
/// and a clock.
#[derive(Clone)]
pub struct ToursEnvironment<C: Clock> {
    /// Clock for time-based operations
    pub clock: C,
    /// Where tours come from: the real catalog client or a test stub
    pub source: Arc<dyn TourSource>,
    /// Token the consumer signals on teardown
    pub cancellation: CancellationToken,
}

impl<C: Clock> ToursEnvironment<C> {
    /// Create an environment with a fresh cancellation token
    pub fn new(clock: C, source: Arc<dyn TourSource>) -> Self {
        Self {
            clock,
            source,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token (to share one with the consumer)
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl<C: Clock> std::fmt::Debug for ToursEnvironment<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToursEnvironment")
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Tours reducer
///
/// `FetchRequested` is the only action that produces an effect; the two
/// resolution actions are pure terminal transitions.
#[derive(Debug, Clone, Copy)]
pub struct ToursReducer<C> {
    _phantom: std::marker::PhantomData<C>,
}

impl<C> ToursReducer<C> {
    /// Create a new tours reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<C> Default for ToursReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Reducer for ToursReducer<C> {
    type State = ToursState;
    type Action = ToursAction;
    type Environment = ToursEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ToursAction::FetchRequested => {
                state.remote = RemoteData::Loading;

                let source = Arc::clone(&environment.source);
                let fetch = Effect::Future(Box::pin(async move {
                    match source.fetch_tours().await {
                        Ok(tours) => Some(ToursAction::ToursLoaded(tours)),
                        Err(e) => {
                            // Kind stays in the logs; the consumer gets one message.
                            tracing::warn!(
                                error = %e,
                                transport = e.is_transport(),
                                "Tour fetch failed"
                            );
                            Some(ToursAction::FetchFailed(e.user_message().to_string()))
                        },
                    }
                }));

                smallvec![Effect::cancellable(
                    environment.cancellation.clone(),
                    fetch
                )]
            },
            ToursAction::ToursLoaded(tours) => {
                state.remote = RemoteData::Loaded(tours);
                smallvec![Effect::None]
            },
            ToursAction::FetchFailed(message) => {
                state.remote = RemoteData::Failed(message);
                smallvec![Effect::None]
            },
        }
    }
}
