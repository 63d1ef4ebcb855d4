//! Freehand signature capture
//!
//! Models the signature surface as an explicit raster buffer. Strokes are
//! rendered into the buffer as they arrive, and a full-canvas PNG snapshot
//! is emitted at the end of every stroke. The visible bitmap is the
//! contract, not the gesture sequence, so snapshots always re-encode the
//! whole buffer.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use shared::models::{EncodedRaster, SignatureState};
use thiserror::Error;

/// Default capture surface size, matching the form layout.
pub const DEFAULT_WIDTH: u32 = 350;
pub const DEFAULT_HEIGHT: u32 = 150;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PEN: Rgba<u8> = Rgba([23, 23, 28, 255]);
const PEN_WIDTH: f32 = 2.0;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Failed to encode signature snapshot: {0}")]
    Encode(#[from] image::ImageError),
}

/// A pointer or touch coordinate relative to the capture surface origin.
///
/// Mouse and touch inputs report viewport coordinates; both are normalized
/// through [`SurfacePoint::from_client`] before the pad sees them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalize a viewport coordinate against the surface origin.
    pub fn from_client(client_x: f32, client_y: f32, origin_x: f32, origin_y: f32) -> Self {
        Self {
            x: client_x - origin_x,
            y: client_y - origin_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PadState {
    #[default]
    Idle,
    Drawing,
}

/// Change callback: `Some(snapshot)` at stroke end, `None` on clear.
pub type SignatureCallback = Box<dyn FnMut(Option<EncodedRaster>) + Send>;

/// One signature capture surface. A report form owns two independent pads,
/// one for the owner and one for the technician.
pub struct SignaturePad {
    canvas: RgbaImage,
    state: PadState,
    has_content: bool,
    cursor: Option<SurfacePoint>,
    last_snapshot: Option<EncodedRaster>,
    on_change: Option<SignatureCallback>,
}

impl SignaturePad {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, BACKGROUND),
            state: PadState::Idle,
            has_content: false,
            cursor: None,
            last_snapshot: None,
            on_change: None,
        }
    }

    /// Register the change callback the owning form listens on.
    pub fn on_change(&mut self, callback: SignatureCallback) {
        self.on_change = Some(callback);
    }

    pub fn is_drawing(&self) -> bool {
        self.state == PadState::Drawing
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn state(&self) -> SignatureState {
        SignatureState {
            has_content: self.has_content,
            encoded_image: self.last_snapshot.clone(),
        }
    }

    /// Contact begins: start a new path at the contact point.
    pub fn pointer_down(&mut self, point: SurfacePoint) {
        if self.state == PadState::Drawing {
            return;
        }
        let point = self.clamp(point);
        self.stamp(point);
        self.cursor = Some(point);
        self.state = PadState::Drawing;
        self.has_content = true;
    }

    /// Contact moves: extend the current path and render the segment
    /// immediately. Ignored unless a stroke is in progress.
    pub fn pointer_move(&mut self, point: SurfacePoint) {
        if self.state != PadState::Drawing {
            return;
        }
        let point = self.clamp(point);
        if let Some(from) = self.cursor {
            self.draw_segment(from, point);
        }
        self.cursor = Some(point);
    }

    /// Contact ends: close the path and emit a full-canvas snapshot.
    pub fn pointer_up(&mut self) {
        if self.state != PadState::Drawing {
            return;
        }
        self.state = PadState::Idle;
        self.cursor = None;
        match self.snapshot() {
            Ok(snapshot) => {
                self.last_snapshot = Some(snapshot.clone());
                self.emit(Some(snapshot));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Dropping signature snapshot");
            }
        }
    }

    /// The pointer left the surface. Must behave exactly like
    /// [`SignaturePad::pointer_up`] so no open path dangles.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Repaint the canvas with the background color and reset. Callable from
    /// any state; emits `None` through the callback.
    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.state = PadState::Idle;
        self.has_content = false;
        self.cursor = None;
        self.last_snapshot = None;
        self.emit(None);
    }

    /// Encode the whole canvas as a PNG data URL. Always reflects the
    /// cumulative result of every stroke since the last clear.
    pub fn snapshot(&self) -> Result<EncodedRaster, SignatureError> {
        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            self.canvas.write_to(&mut cursor, ImageFormat::Png)?;
        }
        let encoded = STANDARD.encode(&buffer);
        Ok(EncodedRaster::new(format!("data:image/png;base64,{encoded}")))
    }

    fn emit(&mut self, snapshot: Option<EncodedRaster>) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(snapshot);
        }
    }

    fn clamp(&self, point: SurfacePoint) -> SurfacePoint {
        SurfacePoint {
            x: point.x.clamp(0.0, (self.canvas.width() - 1) as f32),
            y: point.y.clamp(0.0, (self.canvas.height() - 1) as f32),
        }
    }

    /// Stamp a round pen dot, giving strokes their round caps and joins.
    fn stamp(&mut self, center: SurfacePoint) {
        let radius = PEN_WIDTH / 2.0;
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil() as u32).min(self.canvas.width() - 1);
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_y = ((center.y + radius).ceil() as u32).min(self.canvas.height() - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - center.x;
                let dy = y as f32 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.canvas.put_pixel(x, y, PEN);
                }
            }
        }
    }

    fn draw_segment(&mut self, from: SurfacePoint, to: SurfacePoint) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.stamp(SurfacePoint::new(from.x + dx * t, from.y + dy * t));
        }
    }
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignaturePad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignaturePad")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .field("state", &self.state)
            .field("has_content", &self.has_content)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn decode(snapshot: &EncodedRaster) -> RgbaImage {
        let data = snapshot
            .as_str()
            .strip_prefix("data:image/png;base64,")
            .unwrap();
        let bytes = STANDARD.decode(data).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgba8()
    }

    fn stroke(pad: &mut SignaturePad, from: (f32, f32), to: (f32, f32)) {
        pad.pointer_down(SurfacePoint::new(from.0, from.1));
        pad.pointer_move(SurfacePoint::new(to.0, to.1));
        pad.pointer_up();
    }

    #[test]
    fn test_clear_restores_pristine_encoding() {
        let mut pad = SignaturePad::new();
        let pristine = pad.snapshot().unwrap();

        stroke(&mut pad, (10.0, 10.0), (60.0, 40.0));
        assert_ne!(pad.snapshot().unwrap(), pristine);

        pad.clear();
        assert_eq!(pad.snapshot().unwrap(), pristine);
        assert!(!pad.has_content());
    }

    #[test]
    fn test_stroke_state_transitions() {
        let mut pad = SignaturePad::new();
        assert!(!pad.is_drawing());
        assert!(!pad.has_content());

        pad.pointer_down(SurfacePoint::new(20.0, 20.0));
        assert!(pad.is_drawing());
        assert!(pad.has_content());

        pad.pointer_move(SurfacePoint::new(40.0, 30.0));
        assert!(pad.is_drawing());

        pad.pointer_up();
        assert!(!pad.is_drawing());
        assert!(pad.has_content());
    }

    #[test]
    fn test_pointer_leave_behaves_like_pointer_up() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);

        let mut pad = SignaturePad::new();
        pad.on_change(Box::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot);
        }));

        pad.pointer_down(SurfacePoint::new(20.0, 20.0));
        pad.pointer_move(SurfacePoint::new(50.0, 50.0));
        pad.pointer_leave();

        assert!(!pad.is_drawing());
        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].is_some());

        // Moves after the pointer left must not reopen the path.
        drop(emitted);
        let before = pad.snapshot().unwrap();
        pad.pointer_move(SurfacePoint::new(100.0, 100.0));
        assert_eq!(pad.snapshot().unwrap(), before);
    }

    #[test]
    fn test_snapshots_are_cumulative_across_strokes() {
        let mut pad = SignaturePad::new();
        stroke(&mut pad, (10.0, 10.0), (30.0, 10.0));
        let first = pad.snapshot().unwrap();

        stroke(&mut pad, (200.0, 100.0), (220.0, 100.0));
        let second = pad.snapshot().unwrap();
        assert_ne!(second, first);

        // The second snapshot still contains the first stroke.
        let canvas = decode(&second);
        assert_ne!(*canvas.get_pixel(20, 10), BACKGROUND);
        assert_ne!(*canvas.get_pixel(210, 100), BACKGROUND);
    }

    #[test]
    fn test_clear_emits_none() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);

        let mut pad = SignaturePad::new();
        pad.on_change(Box::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot);
        }));

        stroke(&mut pad, (10.0, 10.0), (30.0, 20.0));
        pad.clear();

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert!(emitted[0].is_some());
        assert!(emitted[1].is_none());
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let mut pad = SignaturePad::new();
        let pristine = pad.snapshot().unwrap();

        pad.pointer_move(SurfacePoint::new(50.0, 50.0));
        pad.pointer_up();

        assert_eq!(pad.snapshot().unwrap(), pristine);
        assert!(!pad.has_content());
    }

    #[test]
    fn test_out_of_bounds_points_are_clamped() {
        let mut pad = SignaturePad::new();
        stroke(&mut pad, (-20.0, -20.0), (10_000.0, 10_000.0));
        // Nothing to assert beyond not panicking and content being present.
        assert!(pad.has_content());
    }

    #[test]
    fn test_touch_normalization() {
        let point = SurfacePoint::from_client(120.0, 80.0, 100.0, 50.0);
        assert_eq!(point, SurfacePoint::new(20.0, 30.0));
    }
}
