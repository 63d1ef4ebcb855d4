//! Report assembly
//!
//! Validates the collected inputs and turns them into one submission-ready
//! payload. Photo encoding fans out concurrently over all assets, but the
//! payload keeps selection order and assembly is all-or-nothing: one bad
//! photo fails the whole attempt without a partial payload.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use shared::models::{EncodedRaster, GeoCoordinate, ReportFields, ReportPayload};
use thiserror::Error;
use validator::Validate;

use crate::photos::{PhotoAsset, PhotoSource};

/// Which of the two signatures a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRole {
    Owner,
    Technician,
}

impl std::fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureRole::Owner => write!(f, "Owner"),
            SignatureRole::Technician => write!(f, "Technician"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("{0} signature is required")]
    MissingSignature(SignatureRole),

    #[error("Invalid report fields: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Could not process photo {index} ({file_name}): {source}")]
    AssetEncoding {
        index: usize,
        file_name: String,
        source: EncodeError,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unrecognized image data: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("Photo encoding failed: {0}")]
    Failed(String),
}

/// Converts one photo source into its portable textual encoding.
#[async_trait]
pub trait PhotoEncoder: Send + Sync {
    async fn encode(&self, source: &PhotoSource) -> Result<EncodedRaster, EncodeError>;
}

/// Default encoder: verifies the bytes decode as an image, then emits a
/// mime-typed base64 data URL of the original file bytes.
#[derive(Debug, Default)]
pub struct Base64PhotoEncoder;

#[async_trait]
impl PhotoEncoder for Base64PhotoEncoder {
    async fn encode(&self, source: &PhotoSource) -> Result<EncodedRaster, EncodeError> {
        image::load_from_memory(&source.bytes)?;
        let mime = mime_guess::from_path(&source.file_name).first_or_octet_stream();
        let encoded = STANDARD.encode(&source.bytes);
        Ok(EncodedRaster::new(format!("data:{mime};base64,{encoded}")))
    }
}

/// Builds [`ReportPayload`]s from the capture components' current state.
/// Purely read-and-transform: no side effects on pads, tray, or location.
pub struct ReportAssembler {
    encoder: Arc<dyn PhotoEncoder>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self {
            encoder: Arc::new(Base64PhotoEncoder),
        }
    }

    pub fn with_encoder(encoder: Arc<dyn PhotoEncoder>) -> Self {
        Self { encoder }
    }

    /// Validate inputs, encode all photos concurrently, and build the
    /// payload. Encoding results are kept in selection order regardless of
    /// completion order; any single failure aborts the whole assembly.
    pub async fn assemble(
        &self,
        fields: &ReportFields,
        owner_signature: Option<&EncodedRaster>,
        technician_signature: Option<&EncodedRaster>,
        photos: &[PhotoAsset],
        location: Option<GeoCoordinate>,
    ) -> Result<ReportPayload, AssembleError> {
        fields.validate()?;

        let owner_signature = owner_signature
            .ok_or(AssembleError::MissingSignature(SignatureRole::Owner))?
            .clone();
        let technician_signature = technician_signature
            .ok_or(AssembleError::MissingSignature(SignatureRole::Technician))?
            .clone();

        let encoded_photos = try_join_all(photos.iter().enumerate().map(|(index, asset)| {
            let encoder = Arc::clone(&self.encoder);
            let source = asset.source.clone();
            async move {
                encoder
                    .encode(&source)
                    .await
                    .map_err(|err| AssembleError::AssetEncoding {
                        index,
                        file_name: source.file_name.clone(),
                        source: err,
                    })
            }
        }))
        .await?;

        tracing::debug!(
            photos = encoded_photos.len(),
            has_location = location.is_some(),
            "Assembled report payload"
        );

        Ok(ReportPayload::new(
            fields.clone(),
            location,
            encoded_photos,
            owner_signature,
            technician_signature,
        ))
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAssembler").finish()
    }
}
