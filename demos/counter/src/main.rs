//! Counter demo binary
//!
//! Demonstrates the tourkit architecture with a global counter store:
//! dispatch the four named operations, read snapshots, and observe
//! mutations through a subscription.

use counter_demo::{CounterAction, CounterEnvironment, CounterReducer, CounterState, CounterStatus};
use tourkit_core::environment::SystemClock;
use tourkit_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter_demo=debug,tourkit_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Counter Demo: tourkit architecture ===\n");
    tracing::info!("Starting counter demo");

    let env = CounterEnvironment::new(SystemClock);
    let store = Store::new(CounterState::default(), CounterReducer::new(), env);

    // A subscriber sees every mutation, in mutation order.
    let mut subscription = store.subscribe();
    let observer = tokio::spawn(async move {
        while subscription.changed().await.is_ok() {
            let snapshot = subscription.borrow_and_update().clone();
            println!(
                "  [observer] count = {}, status = {}",
                snapshot.count, snapshot.status
            );
        }
    });

    let initial = store.state(|s| s.clone()).await;
    println!(
        "Initial state: count = {}, status = {}",
        initial.count, initial.status
    );

    for action in [
        CounterAction::Increment,
        CounterAction::Increment,
        CounterAction::Decrement,
        CounterAction::SetStatus(CounterStatus::Active),
        CounterAction::Reset,
        CounterAction::SetStatus(CounterStatus::Inactive),
    ] {
        println!("\n>>> Sending: {action:?}");
        let _ = store.send(action).await;
        let snapshot = store.state(|s| s.clone()).await;
        println!(
            "State: count = {}, status = {}",
            snapshot.count, snapshot.status
        );
    }

    drop(store);
    let _ = observer.await;

    println!("\n=== Done ===");
}
