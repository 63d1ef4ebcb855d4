//! Encoded raster images
//!
//! Photos and signatures travel in the payload as base64 data URLs of a
//! bitmap snapshot, never as stroke logs or raw file bytes.

use serde::{Deserialize, Serialize};

/// A portable textual encoding of a bitmap image (`data:<mime>;base64,...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedRaster(String);

impl EncodedRaster {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Current state of a signature capture surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureState {
    /// True once a stroke has been started since the last clear.
    pub has_content: bool,
    /// Full-canvas snapshot emitted at the end of the most recent stroke.
    pub encoded_image: Option<EncodedRaster>,
}
