//! Off-screen, native-size duplicate of the composed page
//!
//! The exporter never captures the live, scaled page. It asks the
//! [`SnapshotIsolator`] for a detached copy of the native layout, hosted in
//! the single [`OffscreenHost`] slot for as long as the returned
//! [`IsolatedSnapshot`] guard lives.

use crate::Result;
use crate::error::ExportError;
use crate::layout::{BlockKind, PageLayout, Size};
use crate::metrics::PageMetrics;
use crate::preview::PresentationStyle;
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Detached, style-normalized copy of a page
#[derive(Debug, Clone)]
pub struct Snapshot {
    page: PageLayout,
    width: f32,
    min_height: f32,
    presentation: PresentationStyle,
}

impl Snapshot {
    pub fn page(&self) -> &PageLayout {
        &self.page
    }

    /// Pinned width in pixel-equivalent units
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Height the snapshot occupies: its minimum, or more if the page is taller
    pub fn height(&self) -> f32 {
        self.min_height.max(self.page.size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height())
    }

    pub fn presentation(&self) -> &PresentationStyle {
        &self.presentation
    }
}

/// The single off-viewport container snapshots are hosted in
#[derive(Debug, Clone, Default)]
pub struct OffscreenHost {
    slot: Arc<Mutex<Option<Size>>>,
}

impl OffscreenHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot is currently attached
    pub fn is_occupied(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Size of the attached container, if any
    pub fn container_size(&self) -> Option<Size> {
        *self.slot.lock()
    }

    fn attach(&self, size: Size) -> Result<()> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(ExportError::CaptureError(
                "Off-screen container is already in use".to_string(),
            ));
        }
        *slot = Some(size);
        Ok(())
    }

    fn detach(&self) {
        if self.slot.lock().take().is_some() {
            trace!("Off-screen container removed");
        }
    }
}

/// A snapshot attached to the [`OffscreenHost`]; detached again on drop
#[derive(Debug)]
pub struct IsolatedSnapshot {
    host: OffscreenHost,
    snapshot: Snapshot,
}

impl Deref for IsolatedSnapshot {
    type Target = Snapshot;

    fn deref(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl Drop for IsolatedSnapshot {
    fn drop(&mut self) {
        self.host.detach();
    }
}

/// Produces isolated native-size duplicates of composed pages
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotIsolator {
    metrics: PageMetrics,
}

impl SnapshotIsolator {
    pub fn new(metrics: PageMetrics) -> Self {
        Self { metrics }
    }

    /// Duplicate `page` into `host`.
    ///
    /// The copy is pinned to the page width with a minimum height of one
    /// page, and carries no transform or screen chrome. The page must have
    /// been composed at native size with its body clipped, otherwise the
    /// copy could not match the live page.
    #[instrument(skip_all)]
    pub fn isolate(&self, host: &OffscreenHost, page: &PageLayout) -> Result<IsolatedSnapshot> {
        let width = self.metrics.width_px();
        let min_height = self.metrics.height_px();

        if (page.size.width - width).abs() > 0.5 {
            return Err(ExportError::CaptureError(format!(
                "Page laid out at {:.2}px wide, expected native width {:.2}px",
                page.size.width, width
            )));
        }
        if page.block(BlockKind::Body).is_some_and(|body| !body.clip) {
            return Err(ExportError::CaptureError(
                "Body block is not clipped at the fixed page height".to_string(),
            ));
        }

        // Normalize everything before attaching
        let snapshot = Snapshot {
            page: page.clone(),
            width,
            min_height,
            presentation: PresentationStyle::native(),
        };

        host.attach(snapshot.size())?;
        debug!(
            "Isolated snapshot {:.2}x{:.2}",
            snapshot.width(),
            snapshot.height()
        );
        Ok(IsolatedSnapshot {
            host: host.clone(),
            snapshot,
        })
    }
}
