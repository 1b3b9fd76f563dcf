//! Tours demo binary
//!
//! Fetches the tour catalog through the store and renders one line per
//! validated record, or the single collapsed error message.
//!
//! Set `TOURS_URL` to point at a different endpoint (e.g. a local mock).

use std::sync::Arc;
use std::time::Duration;

use tourkit_catalog::{CatalogClient, DEFAULT_CATALOG_URL};
use tourkit_core::environment::SystemClock;
use tourkit_runtime::Store;
use tours_demo::{ToursAction, ToursEnvironment, ToursReducer, ToursState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tours_demo=debug,tourkit_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let url = std::env::var("TOURS_URL").unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string());
    println!("=== Tours Demo: fetching {url} ===\n");

    let client = CatalogClient::with_base_url(url);
    let env = ToursEnvironment::new(SystemClock, Arc::new(client));
    let store = Store::new(ToursState::default(), ToursReducer::new(), env);

    println!("Loading...");
    let resolution = store
        .send_and_wait_for(
            ToursAction::FetchRequested,
            |a| {
                matches!(
                    a,
                    ToursAction::ToursLoaded(_) | ToursAction::FetchFailed(_)
                )
            },
            Duration::from_secs(30),
        )
        .await;

    match resolution {
        Ok(ToursAction::ToursLoaded(tours)) => {
            println!("Fetched {} tours:\n", tours.len());
            for tour in &tours {
                println!("  {} - {}", tour.name, tour.price);
            }
        },
        Ok(ToursAction::FetchFailed(message)) => {
            println!("Error... {message}");
        },
        Ok(ToursAction::FetchRequested) => {
            // The predicate only matches terminal actions.
            println!("Loading...");
        },
        Err(e) => {
            eprintln!("Fetch did not resolve: {e}");
        },
    }
}
