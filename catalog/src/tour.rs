//! Tour data model and schema validation
//!
//! Validation lives next to the model: [`parse_tours`] is the single place
//! a raw response body becomes trusted data.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

/// A remotely-sourced travel-package record
///
/// All five fields are required strings. `price` stays string-encoded on
/// purpose: the server sends it that way and nothing downstream does
/// arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    /// Opaque identifier, unique within a response batch
    pub id: String,
    /// Display name
    pub name: String,
    /// Descriptive text
    pub info: String,
    /// Image URL
    pub image: String,
    /// String-encoded price
    pub price: String,
}

/// Parse and validate a response body as a batch of tours
///
/// The contract is all-or-nothing: the top level must be a JSON array and
/// every element must satisfy the [`Tour`] shape, otherwise the whole
/// batch is rejected. Unknown fields on a record are ignored. Order is
/// preserved from the wire.
///
/// # Errors
///
/// Returns [`CatalogError::Validation`] if the body is not valid JSON,
/// is not a top-level array, or any record is missing a field or carries
/// a non-string value. The message names the first failing record index.
pub fn parse_tours(body: &str) -> Result<Vec<Tour>, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::Validation(format!("body is not valid JSON: {e}")))?;

    let Some(items) = value.as_array() else {
        return Err(CatalogError::Validation(
            "expected a top-level array".to_string(),
        ));
    };

    let mut tours = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let tour: Tour = serde_json::from_value(item.clone())
            .map_err(|e| CatalogError::Validation(format!("record {index}: {e}")))?;
        tours.push(tour);
    }

    Ok(tours)
}
