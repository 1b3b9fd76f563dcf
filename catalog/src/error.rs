//! Error types for the tour catalog client

use thiserror::Error;

/// Errors that can occur when fetching and validating tours
///
/// Transport and validation failures are distinct kinds so diagnostics can
/// tell them apart, but both collapse to the same user-facing message via
/// [`CatalogError::user_message`]. Every kind is scoped to a single fetch
/// attempt; the caller recovers by fetching again.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed before a response was received
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server responded with a non-success status
    #[error("Unexpected status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response received but it fails schema validation
    #[error("Invalid tour payload: {0}")]
    Validation(String),
}

impl CatalogError {
    /// Whether this error happened at the transport layer
    ///
    /// A non-success status counts as transport: no trustworthy body was
    /// received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Whether this error happened during schema validation
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Single user-facing message, regardless of kind
    ///
    /// Consumers display one error state; the kind stays available
    /// internally for logging.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        "There was an error loading tours"
    }
}
