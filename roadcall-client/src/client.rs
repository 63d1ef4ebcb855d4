//! Report submission client

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shared::models::{ReportPayload, SubmissionResult};

use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Fallback message when the server omits one on success.
const GENERIC_SUCCESS_MESSAGE: &str = "Report submitted successfully!";

/// Message for any transport-level fault.
const GENERIC_TRANSPORT_MESSAGE: &str = "Network or unexpected error occurred.";

/// Success response body. All fields optional: a bare 2xx still counts.
#[derive(Deserialize)]
struct SubmitResponseBody {
    #[serde(default, rename = "reportId")]
    report_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Structured error body the reports API may return on failure.
#[derive(Deserialize)]
struct ErrorResponseBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the reports API. One POST per submission attempt, no
/// automatic retry; resubmitting is the caller's decision.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    client: Client,
    config: ClientConfig,
}

impl SubmissionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self { client, config })
    }

    /// Build a client from the environment-supplied endpoint.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfig::from_env()?.build_client()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit one report payload.
    ///
    /// Every outcome maps to a [`SubmissionResult`]; transport faults (DNS,
    /// refused connection, timeout, malformed response) are caught and
    /// converted, never surfaced as an unhandled fault.
    pub async fn submit(&self, payload: &ReportPayload) -> SubmissionResult {
        let url = self.config.reports_url();
        tracing::info!(
            url = %url,
            photos = payload.photos.len(),
            has_location = payload.location.is_some(),
            "Submitting fault report"
        );

        let response = match self.client.post(&url).json(payload).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "Report submission failed in transport");
                return SubmissionResult::Failure {
                    message: GENERIC_TRANSPORT_MESSAGE.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<SubmitResponseBody>().await {
                Ok(body) => {
                    let report_id = body.report_id;
                    tracing::info!(report_id = ?report_id, "Report accepted");
                    SubmissionResult::Success {
                        message: body
                            .message
                            .unwrap_or_else(|| GENERIC_SUCCESS_MESSAGE.to_string()),
                        report_id,
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Could not parse submission response");
                    SubmissionResult::Failure {
                        message: GENERIC_TRANSPORT_MESSAGE.to_string(),
                    }
                }
            }
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponseBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message.or(parsed.error))
                .unwrap_or_else(|| format!("Error submitting report: {status}"));
            tracing::warn!(status = %status, message = %message, "Report rejected");
            SubmissionResult::Failure { message }
        }
    }
}
