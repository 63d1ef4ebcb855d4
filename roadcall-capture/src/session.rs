//! Per-form submission state
//!
//! One `ReportSession` per open report form. It holds the latest signature
//! encodings, the photo tray, the applied location fix, and an explicit
//! submission-attempt counter the form reads to decide when to surface
//! missing-signature hints.

use shared::models::{EncodedRaster, GeoCoordinate, ReportFields, ReportPayload};

use crate::assembler::{AssembleError, ReportAssembler};
use crate::location::LocationError;
use crate::photos::PhotoTray;

#[derive(Debug, Default)]
pub struct ReportSession {
    owner_signature: Option<EncodedRaster>,
    technician_signature: Option<EncodedRaster>,
    photos: PhotoTray,
    location: Option<GeoCoordinate>,
    location_error: Option<String>,
    active_location_request: Option<u64>,
    submit_attempts: u32,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink for the owner pad's change callback.
    pub fn set_owner_signature(&mut self, snapshot: Option<EncodedRaster>) {
        self.owner_signature = snapshot;
    }

    /// Sink for the technician pad's change callback.
    pub fn set_technician_signature(&mut self, snapshot: Option<EncodedRaster>) {
        self.technician_signature = snapshot;
    }

    pub fn owner_signature(&self) -> Option<&EncodedRaster> {
        self.owner_signature.as_ref()
    }

    pub fn technician_signature(&self) -> Option<&EncodedRaster> {
        self.technician_signature.as_ref()
    }

    pub fn photos(&self) -> &PhotoTray {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut PhotoTray {
        &mut self.photos
    }

    pub fn location(&self) -> Option<GeoCoordinate> {
        self.location
    }

    /// Advisory message from the most recent failed location request.
    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    /// Note which logical location request the form is currently waiting
    /// on. Purely informational: completions are applied either way.
    pub fn begin_location_request(&mut self, request_id: u64) {
        self.location_error = None;
        self.active_location_request = Some(request_id);
    }

    /// Apply a completed location request. There is no cancellation token,
    /// so completions from superseded requests arrive here too and are
    /// applied like any other.
    pub fn apply_location_fix(
        &mut self,
        request_id: u64,
        result: Result<GeoCoordinate, LocationError>,
    ) {
        if self.active_location_request == Some(request_id) {
            self.active_location_request = None;
        } else {
            tracing::debug!(request_id, "Applying completion of a superseded location request");
        }
        match result {
            Ok(fix) => {
                tracing::info!(%fix, "Location captured");
                self.location = Some(fix);
                self.location_error = None;
            }
            Err(err) => {
                // Advisory only; an earlier fix, if any, is kept.
                self.location_error = Some(err.to_string());
            }
        }
    }

    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    /// Build a fresh payload from the current state, counting the attempt.
    /// Location problems never block this; location is simply absent.
    pub async fn build_payload(
        &mut self,
        assembler: &ReportAssembler,
        fields: &ReportFields,
    ) -> Result<ReportPayload, AssembleError> {
        self.submit_attempts += 1;
        assembler
            .assemble(
                fields,
                self.owner_signature.as_ref(),
                self.technician_signature.as_ref(),
                self.photos.assets(),
                self.location,
            )
            .await
    }

    /// Form unmount path: release all preview resources. Safe to call with
    /// a location request or submission still outstanding.
    pub fn dispose(&mut self) {
        self.photos.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::assembler::SignatureRole;
    use crate::location::{GeolocationProvider, LocationCapture, LocationOptions};
    use crate::photos::PhotoSource;

    fn valid_fields() -> ReportFields {
        ReportFields {
            owner_name: "John Doe".to_string(),
            phone_number: "(555) 123-4567".to_string(),
            license_plate: "ABC-123".to_string(),
            fault_description: "Battery drains overnight, suspect parasitic draw.".to_string(),
        }
    }

    fn signature(tag: &str) -> EncodedRaster {
        EncodedRaster::new(format!("data:image/png;base64,{tag}"))
    }

    struct SlowProvider {
        delay: Duration,
        fix: GeoCoordinate,
    }

    #[async_trait]
    impl GeolocationProvider for SlowProvider {
        async fn current_position(
            &self,
            _options: LocationOptions,
        ) -> Result<GeoCoordinate, LocationError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.fix)
        }
    }

    #[tokio::test]
    async fn test_superseded_location_completion_is_still_applied() {
        let session = Arc::new(Mutex::new(ReportSession::new()));
        let capture = LocationCapture::new(Arc::new(SlowProvider {
            delay: Duration::from_millis(30),
            fix: GeoCoordinate::new(40.4168, -3.7038),
        }));

        // First request goes out, then the form "moves on" to a second one
        // before the first resolves. Neither is cancelled.
        let sink = Arc::clone(&session);
        let first = capture.spawn_capture(move |id, result| {
            sink.lock().unwrap().apply_location_fix(id, result);
        });
        session.lock().unwrap().begin_location_request(first);

        let sink = Arc::clone(&session);
        let second = capture.spawn_capture(move |id, result| {
            sink.lock().unwrap().apply_location_fix(id, result);
        });
        session.lock().unwrap().begin_location_request(second);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let session = session.lock().unwrap();
        assert_eq!(
            session.location(),
            Some(GeoCoordinate::new(40.4168, -3.7038))
        );
        assert!(session.location_error().is_none());
    }

    #[tokio::test]
    async fn test_location_failure_is_advisory() {
        let mut session = ReportSession::new();
        session.set_owner_signature(Some(signature("owner")));
        session.set_technician_signature(Some(signature("tech")));

        session.begin_location_request(1);
        session.apply_location_fix(1, Err(LocationError::PermissionDenied));
        assert_eq!(session.location_error(), Some("Location permission denied"));

        // The failed fix does not block payload assembly.
        let assembler = ReportAssembler::new();
        let payload = session
            .build_payload(&assembler, &valid_fields())
            .await
            .unwrap();
        assert!(payload.location.is_none());
    }

    #[tokio::test]
    async fn test_failed_fix_keeps_earlier_location() {
        let mut session = ReportSession::new();
        session.apply_location_fix(1, Ok(GeoCoordinate::new(1.0, 2.0)));
        session.apply_location_fix(2, Err(LocationError::Timeout));

        assert_eq!(session.location(), Some(GeoCoordinate::new(1.0, 2.0)));
        assert!(session.location_error().is_some());
    }

    #[tokio::test]
    async fn test_attempt_counter_tracks_every_attempt() {
        let mut session = ReportSession::new();
        let assembler = ReportAssembler::new();

        // Two failed attempts (missing signatures), then a successful one.
        for _ in 0..2 {
            let err = session
                .build_payload(&assembler, &valid_fields())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AssembleError::MissingSignature(SignatureRole::Owner)
            ));
        }
        assert_eq!(session.submit_attempts(), 2);

        session.set_owner_signature(Some(signature("owner")));
        session.set_technician_signature(Some(signature("tech")));
        session
            .build_payload(&assembler, &valid_fields())
            .await
            .unwrap();
        assert_eq!(session.submit_attempts(), 3);
    }

    #[tokio::test]
    async fn test_dispose_releases_previews_with_work_outstanding() {
        let mut session = ReportSession::new();
        session
            .photos_mut()
            .add_files(vec![PhotoSource::new("a.jpg", vec![0u8; 4])]);
        session.begin_location_request(7);

        session.dispose();
        assert_eq!(session.photos().preview_count(), 0);

        // A completion arriving after teardown is still handled safely.
        session.apply_location_fix(7, Ok(GeoCoordinate::new(0.0, 0.0)));
    }
}
