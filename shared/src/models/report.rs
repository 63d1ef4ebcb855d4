//! Fault report model
//!
//! `ReportFields` carries the validated text inputs, `ReportPayload` is the
//! complete submission-ready aggregate, and `SubmissionResult` is what the
//! submission client hands back to the form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EncodedRaster, GeoCoordinate};

/// Permissive international phone format, same shape the intake form uses.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+?\d{1,3}[-.\s]?)?(\(?\d{3}\)?[-.\s]?)?[\d\s-]{7,15}$")
        .expect("phone pattern compiles")
});

/// Text fields collected by the report form.
///
/// Must pass [`Validate::validate`] before a payload is built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportFields {
    #[validate(length(min = 2, message = "Owner name must be at least 2 characters."))]
    pub owner_name: String,

    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,

    #[validate(length(
        min = 3,
        max = 10,
        message = "License plate must be at least 3 characters."
    ))]
    pub license_plate: String,

    #[validate(length(min = 10, message = "Fault description must be at least 10 characters."))]
    pub fault_description: String,
}

/// The complete, submission-ready report.
///
/// Built fresh for every submission attempt by the assembler, which only
/// constructs it once both signatures are present and the fields validated.
/// Immutable once built; dropped after the result is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub owner_name: String,
    pub phone_number: String,
    pub license_plate: String,
    pub fault_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoCoordinate>,
    /// Encoded photos, in selection order.
    pub photos: Vec<EncodedRaster>,
    pub owner_signature: EncodedRaster,
    pub technician_signature: EncodedRaster,
}

impl ReportPayload {
    pub fn new(
        fields: ReportFields,
        location: Option<GeoCoordinate>,
        photos: Vec<EncodedRaster>,
        owner_signature: EncodedRaster,
        technician_signature: EncodedRaster,
    ) -> Self {
        Self {
            owner_name: fields.owner_name,
            phone_number: fields.phone_number,
            license_plate: fields.license_plate,
            fault_description: fields.fault_description,
            location,
            photos,
            owner_signature,
            technician_signature,
        }
    }
}

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success {
        message: String,
        report_id: Option<String>,
    },
    Failure {
        message: String,
    },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    /// User-visible message for either outcome.
    pub fn message(&self) -> &str {
        match self {
            SubmissionResult::Success { message, .. } => message,
            SubmissionResult::Failure { message } => message,
        }
    }
}
