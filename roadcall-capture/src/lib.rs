//! roadcall-capture - Fault report capture pipeline
//!
//! The in-memory components a report form drives while the technician works:
//! signature capture, photo selection with preview lifecycle, one-shot
//! geolocation, and final payload assembly. Everything here is transient
//! state; nothing is persisted locally.

pub mod assembler;
pub mod location;
pub mod photos;
pub mod session;
pub mod signature;

pub use assembler::{
    AssembleError, Base64PhotoEncoder, EncodeError, PhotoEncoder, ReportAssembler, SignatureRole,
};
pub use location::{GeolocationProvider, LocationCapture, LocationError, LocationOptions};
pub use photos::{AddOutcome, PhotoAsset, PhotoSource, PhotoTray, MAX_PHOTOS};
pub use session::ReportSession;
pub use signature::{SignatureError, SignaturePad, SurfacePoint};

// Re-export shared types for convenience
pub use shared::models::{EncodedRaster, GeoCoordinate, ReportFields, ReportPayload, SignatureState};
