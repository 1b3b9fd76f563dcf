//! # Tourkit Catalog
//!
//! Tour catalog data model, schema validation, and HTTP client.
//!
//! The catalog exposes one read-only operation: fetch the remote list of
//! tour records and validate it against the expected shape before anything
//! else in the system is allowed to trust it.
//!
//! ## Example
//!
//! ```no_run
//! use tourkit_catalog::CatalogClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new();
//!     let tours = client.fetch_tours().await?;
//!
//!     for tour in &tours {
//!         println!("{} - {}", tour.name, tour.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Validation contract
//!
//! The wire format is a JSON array of objects with string fields
//! `id, name, info, image, price`. Extra fields are ignored; any missing
//! or mistyped field invalidates the entire batch (fail-fast,
//! all-or-nothing). See [`tour::parse_tours`].

pub mod client;
pub mod error;
pub mod tour;

// Re-export main types for convenience
pub use client::{CatalogClient, DEFAULT_CATALOG_URL, TourSource};
pub use error::CatalogError;
pub use tour::{Tour, parse_tours};
