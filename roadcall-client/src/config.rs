//! Client configuration

use crate::error::ConfigError;

/// Environment variable supplying the reports API base URL.
pub const ENDPOINT_ENV: &str = "ROADCALL_API_URL";

/// Path of the report submission endpoint, relative to the base URL.
pub const REPORTS_PATH: &str = "/reports";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the submission client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Reports API base URL (e.g., "http://localhost:4000/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Endpoint path appended to the base URL
    pub reports_path: String,
}

impl ClientConfig {
    /// Create a new configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            reports_path: REPORTS_PATH.to_string(),
        }
    }

    /// Read the base URL from the environment. An absent or empty variable
    /// is a startup-time configuration error, reported distinctly and never
    /// turned into a submission attempt.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ENDPOINT_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(url)),
            _ => Err(ConfigError::EndpointNotConfigured),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Override the endpoint path
    pub fn with_reports_path(mut self, path: impl Into<String>) -> Self {
        self.reports_path = path.into();
        self
    }

    /// Full submission URL
    pub fn reports_url(&self) -> String {
        format!("{}{}", self.base_url, self.reports_path)
    }

    /// Create a submission client from this configuration
    pub fn build_client(&self) -> Result<super::SubmissionClient, ConfigError> {
        super::SubmissionClient::new(self.clone())
    }
}
