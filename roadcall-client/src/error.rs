//! Client error types

use thiserror::Error;

use crate::config::ENDPOINT_ENV;

/// Startup-time configuration failures. Distinct from submission failures:
/// a client without an endpoint is never constructed, so no request is ever
/// attempted against a missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint environment variable is absent or empty
    #[error("Report endpoint not configured (set {})", ENDPOINT_ENV)]
    EndpointNotConfigured,

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
