//! One-shot location acquisition
//!
//! Wraps a platform geolocation provider behind a trait so the pipeline can
//! run against the real device service or a test double. Requests are
//! fire-and-forget: there is no cancellation token, so a completion may
//! arrive after the logical request it belongs to was superseded, and the
//! receiving side has to tolerate that.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::models::GeoCoordinate;
use thiserror::Error;

/// Options for one platform geolocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    /// Request the most precise fix the platform can produce.
    pub high_accuracy: bool,
    /// How long to wait for a fix before giving up.
    pub timeout: Duration,
    /// Oldest acceptable cached fix. Zero means no cached fix is accepted.
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Typed failure for a geolocation request. Advisory only: location is
/// optional on a report and none of these block submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Timed out waiting for a position fix")]
    Timeout,
    #[error("Current position is unavailable")]
    PositionUnavailable,
    #[error("Geolocation is not supported on this device")]
    Unsupported,
}

/// Platform geolocation service.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(
        &self,
        options: LocationOptions,
    ) -> Result<GeoCoordinate, LocationError>;
}

/// Issues one-shot fixes against a provider.
///
/// Tracks a monotonically increasing request id so the owning session can
/// tell which logical request a completion belongs to; it never cancels an
/// in-flight provider call.
pub struct LocationCapture {
    provider: Arc<dyn GeolocationProvider>,
    options: LocationOptions,
    next_request: AtomicU64,
}

impl LocationCapture {
    pub fn new(provider: Arc<dyn GeolocationProvider>) -> Self {
        Self::with_options(provider, LocationOptions::default())
    }

    pub fn with_options(provider: Arc<dyn GeolocationProvider>, options: LocationOptions) -> Self {
        Self {
            provider,
            options,
            next_request: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> LocationOptions {
        self.options
    }

    /// Await one fix directly, with the configured timeout enforced around
    /// the provider call.
    pub async fn capture(&self) -> Result<GeoCoordinate, LocationError> {
        resolve(Arc::clone(&self.provider), self.options).await
    }

    /// Fire-and-forget request. The completion callback runs whenever the
    /// platform call resolves, which may be after the logical request was
    /// superseded; the callback receives the request id so the receiver can
    /// tell, but late results are still expected to be applied.
    pub fn spawn_capture<F>(&self, on_complete: F) -> u64
    where
        F: FnOnce(u64, Result<GeoCoordinate, LocationError>) + Send + 'static,
    {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed) + 1;
        let provider = Arc::clone(&self.provider);
        let options = self.options;
        tokio::spawn(async move {
            let result = resolve(provider, options).await;
            if let Err(err) = &result {
                tracing::debug!(request_id, error = %err, "Location request failed");
            }
            on_complete(request_id, result);
        });
        request_id
    }
}

impl std::fmt::Debug for LocationCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationCapture")
            .field("options", &self.options)
            .finish()
    }
}

async fn resolve(
    provider: Arc<dyn GeolocationProvider>,
    options: LocationOptions,
) -> Result<GeoCoordinate, LocationError> {
    match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test double that resolves after a fixed delay.
    struct FakeProvider {
        delay: Duration,
        result: Result<GeoCoordinate, LocationError>,
    }

    #[async_trait]
    impl GeolocationProvider for FakeProvider {
        async fn current_position(
            &self,
            _options: LocationOptions,
        ) -> Result<GeoCoordinate, LocationError> {
            tokio::time::sleep(self.delay).await;
            self.result
        }
    }

    #[test]
    fn test_default_options() {
        let options = LocationOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_capture_returns_fix() {
        let provider = Arc::new(FakeProvider {
            delay: Duration::ZERO,
            result: Ok(GeoCoordinate::new(40.4168, -3.7038)),
        });
        let capture = LocationCapture::new(provider);

        let fix = capture.capture().await.unwrap();
        assert_eq!(fix.latitude, 40.4168);
    }

    #[tokio::test]
    async fn test_capture_times_out() {
        let provider = Arc::new(FakeProvider {
            delay: Duration::from_secs(60),
            result: Ok(GeoCoordinate::new(0.0, 0.0)),
        });
        let options = LocationOptions {
            timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let capture = LocationCapture::with_options(provider, options);

        assert_eq!(capture.capture().await, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn test_capture_surfaces_typed_failures() {
        for error in [
            LocationError::PermissionDenied,
            LocationError::PositionUnavailable,
            LocationError::Unsupported,
        ] {
            let provider = Arc::new(FakeProvider {
                delay: Duration::ZERO,
                result: Err(error),
            });
            let capture = LocationCapture::new(provider);
            assert_eq!(capture.capture().await, Err(error));
        }
    }

    #[tokio::test]
    async fn test_spawn_capture_assigns_increasing_request_ids() {
        let provider = Arc::new(FakeProvider {
            delay: Duration::ZERO,
            result: Ok(GeoCoordinate::new(1.0, 2.0)),
        });
        let capture = LocationCapture::new(provider);

        let first = capture.spawn_capture(|_, _| {});
        let second = capture.spawn_capture(|_, _| {});
        assert!(second > first);
    }
}
