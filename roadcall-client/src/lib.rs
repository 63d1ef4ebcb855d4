//! roadcall-client - Submission client for the reports API
//!
//! One POST per submission attempt, with every transport or server failure
//! mapped to a user-facing [`shared::models::SubmissionResult`]. The
//! endpoint comes from the environment at startup; a missing setting is a
//! configuration error, never a runtime submission failure.

pub mod client;
pub mod config;
pub mod error;

pub use client::SubmissionClient;
pub use config::ClientConfig;
pub use error::ConfigError;

// Re-export shared types for convenience
pub use shared::models::{ReportPayload, SubmissionResult};
