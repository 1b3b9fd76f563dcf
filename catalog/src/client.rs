//! HTTP client for the remote tour catalog

use crate::error::CatalogError;
use crate::tour::{Tour, parse_tours};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

/// Fixed endpoint serving the tour catalog
pub const DEFAULT_CATALOG_URL: &str = "https://www.course-api.com/react-tours-project";

/// Anything that can produce a batch of tours
///
/// Feature environments hold an `Arc<dyn TourSource>` so tests can inject
/// a stub instead of the real HTTP client.
///
/// # Dyn Compatibility
///
/// This trait uses an explicit `Pin<Box<dyn Future>>` return instead of
/// `async fn` to enable trait object usage (`Arc<dyn TourSource>`). This is
/// required for the effect system, where reducers create effects that
/// capture the source.
pub trait TourSource: Send + Sync {
    /// Fetch the current batch of tours
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on transport failure or when the response
    /// fails schema validation.
    fn fetch_tours(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Tour>, CatalogError>> + Send + '_>>;
}

/// HTTP client for the tour catalog
///
/// Performs one read-only GET against a fixed endpoint and validates the
/// response before handing it to the caller. No request body, headers, or
/// pagination parameters are involved.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client pointed at the default catalog endpoint
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_CATALOG_URL)
    }

    /// Create a client pointed at a custom endpoint (tests, mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch and validate the tour batch
    ///
    /// A non-success status or a failed request is a transport error; a
    /// body that does not match the tour schema is a validation error. The
    /// two stay distinct here and in the logs, and collapse to one display
    /// message only at the consumer.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Transport`]: request failed before a response arrived
    /// - [`CatalogError::Status`]: server answered with a non-2xx status
    /// - [`CatalogError::Validation`]: response body fails the schema
    #[tracing::instrument(skip(self), fields(url = %self.base_url))]
    pub async fn fetch_tours(&self) -> Result<Vec<Tour>, CatalogError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Catalog request failed");
                CatalogError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Catalog returned non-success status");
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let tours = parse_tours(&body).inspect_err(|e| {
            tracing::warn!(error = %e, "Catalog response failed validation");
        })?;

        tracing::debug!(count = tours.len(), "Fetched tour batch");
        Ok(tours)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TourSource for CatalogClient {
    fn fetch_tours(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Tour>, CatalogError>> + Send + '_>> {
        // Inherent method takes precedence; no recursion here.
        Box::pin(async move { self.fetch_tours().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_points_at_the_fixed_endpoint_by_default() {
        let client = CatalogClient::new();
        assert_eq!(client.base_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn base_url_can_be_overridden() {
        let client = CatalogClient::with_base_url("http://localhost:9000/tours");
        assert_eq!(client.base_url, "http://localhost:9000/tours");
    }
}
