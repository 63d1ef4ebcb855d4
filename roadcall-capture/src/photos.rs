//! Photo asset lifecycle
//!
//! A bounded, ordered collection of selected photos. Every accepted file
//! gets exactly one preview resource out of an explicit arena; the tray is
//! the sole owner of those resources and releases each one exactly once,
//! either when the entry is removed or on manager-wide teardown.

use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of photos per report.
pub const MAX_PHOTOS: usize = 5;

/// Per-file size cap (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Supported photo extensions.
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// A selected source file: name plus raw bytes, as handed over by the
/// platform file picker.
#[derive(Debug, Clone)]
pub struct PhotoSource {
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

impl PhotoSource {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    fn extension(&self) -> Option<String> {
        self.file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
    }
}

/// Handle to one allocated preview resource. Neither `Copy` nor `Clone`:
/// one allocation, one release.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

/// Arena for display-layer preview resources.
///
/// Tracks the renderable representation per handle; releases are explicit
/// and a double release is detectable.
#[derive(Debug, Default)]
struct PreviewRegistry {
    next_id: u64,
    live: HashMap<u64, Arc<[u8]>>,
}

impl PreviewRegistry {
    fn allocate(&mut self, bytes: Arc<[u8]>) -> PreviewHandle {
        self.next_id += 1;
        self.live.insert(self.next_id, bytes);
        PreviewHandle(self.next_id)
    }

    fn release(&mut self, handle: PreviewHandle) {
        if self.live.remove(&handle.0).is_none() {
            tracing::warn!(handle = handle.0, "Released an unknown preview handle");
        }
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// One photo entry: the source file, its preview resource, and its position
/// in selection order.
#[derive(Debug)]
pub struct PhotoAsset {
    pub source: PhotoSource,
    pub preview: PreviewHandle,
    pub order: usize,
}

/// Result of one [`PhotoTray::add_files`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AddOutcome {
    /// Files appended to the tray.
    pub accepted: usize,
    /// Valid files dropped because the tray was at capacity.
    pub dropped: usize,
    /// Files rejected for size or format, independent of capacity.
    pub rejected: usize,
    /// Raised at most once per call, when any valid file was dropped.
    pub capacity_exceeded: bool,
}

/// Bounded ordered photo collection with managed previews.
#[derive(Debug, Default)]
pub struct PhotoTray {
    assets: Vec<PhotoAsset>,
    previews: PreviewRegistry,
}

impl PhotoTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.assets.len() >= MAX_PHOTOS
    }

    /// Live preview resources. Always equals [`PhotoTray::len`].
    pub fn preview_count(&self) -> usize {
        self.previews.live_count()
    }

    pub fn assets(&self) -> &[PhotoAsset] {
        &self.assets
    }

    /// Append a selection, up to the remaining capacity. Valid files beyond
    /// capacity are dropped and the capacity signal is raised exactly once
    /// for the call. Each accepted file gets a freshly allocated preview.
    pub fn add_files(&mut self, selection: Vec<PhotoSource>) -> AddOutcome {
        let mut outcome = AddOutcome::default();

        for source in selection {
            if let Err(reason) = Self::check_file(&source) {
                tracing::debug!(file = %source.file_name, reason, "Rejected photo");
                outcome.rejected += 1;
                continue;
            }
            if self.is_full() {
                outcome.dropped += 1;
                continue;
            }
            let preview = self.previews.allocate(Arc::clone(&source.bytes));
            self.assets.push(PhotoAsset {
                source,
                preview,
                order: self.assets.len(),
            });
            outcome.accepted += 1;
        }

        if outcome.dropped > 0 {
            outcome.capacity_exceeded = true;
            tracing::warn!(
                dropped = outcome.dropped,
                "Photo limit reached, at most {MAX_PHOTOS} photos per report"
            );
        }
        outcome
    }

    /// Release the preview at `index` and remove the entry, preserving the
    /// relative order of the rest. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) {
        if index >= self.assets.len() {
            return;
        }
        let asset = self.assets.remove(index);
        self.previews.release(asset.preview);
        for (order, asset) in self.assets.iter_mut().enumerate() {
            asset.order = order;
        }
    }

    /// Release every remaining preview resource. Called when the owning
    /// form unmounts, regardless of submission outcome. Idempotent.
    pub fn dispose(&mut self) {
        for asset in self.assets.drain(..) {
            self.previews.release(asset.preview);
        }
    }

    fn check_file(source: &PhotoSource) -> Result<(), &'static str> {
        if source.bytes.len() > MAX_FILE_SIZE {
            return Err("file exceeds the 10MB limit");
        }
        match source.extension() {
            Some(ext) if SUPPORTED_FORMATS.contains(&ext.as_str()) => Ok(()),
            _ => Err("unsupported format"),
        }
    }
}
