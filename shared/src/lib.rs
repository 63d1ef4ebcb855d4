//! Shared types for the roadcall workspace
//!
//! Data model and wire types used by both the capture pipeline and the
//! submission client: report fields, payloads, coordinates, and results.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    EncodedRaster, GeoCoordinate, ReportFields, ReportPayload, SignatureState, SubmissionResult,
};
