//! Responsive scaling of the fixed-size page
//!
//! The page is laid out once at native size. Fitting it into a narrower
//! container is a pure presentation transform (uniform scale from the
//! top-left corner); nothing here ever triggers a re-layout.

use crate::Result;
use crate::constants::DEFAULT_PREVIEW_GUTTER;
use crate::error::ExportError;
use crate::layout::{Point, Size};
use crate::metrics::PageMetrics;
use tracing::{debug, trace};

/// Dimensionless display scale in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LayoutScale(f32);

impl LayoutScale {
    /// Native size, no scaling
    pub const NATIVE: LayoutScale = LayoutScale(1.0);

    /// Scale for a container offering `available_width` pixels:
    /// `min(available_width / page width, 1)`
    pub fn for_width(available_width: f32, metrics: &PageMetrics) -> Result<Self> {
        if !available_width.is_finite() || available_width <= 0.0 {
            return Err(ExportError::DimensionError(format!(
                "Available width must be positive, got {}",
                available_width
            )));
        }
        Ok(Self((available_width / metrics.width_px()).min(1.0)))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_native(&self) -> bool {
        self.0 == 1.0
    }
}

impl Default for LayoutScale {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Uniform scale anchored at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f32,
}

impl DisplayTransform {
    pub const IDENTITY: DisplayTransform = DisplayTransform { scale: 1.0 };

    pub fn from_scale(scale: LayoutScale) -> Self {
        Self {
            scale: scale.value(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0
    }

    /// Map a native page point to screen space
    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.scale, point.y * self.scale)
    }
}

/// Tracks the container width and derives the current [`LayoutScale`]
#[derive(Debug, Clone)]
pub struct LayoutScaler {
    metrics: PageMetrics,
    /// Container padding subtracted before fitting
    gutter: f32,
    current: LayoutScale,
}

impl LayoutScaler {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            gutter: DEFAULT_PREVIEW_GUTTER,
            current: LayoutScale::NATIVE,
        }
    }

    /// Set the horizontal padding of the hosting container
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter.max(0.0);
        self
    }

    pub fn current(&self) -> LayoutScale {
        self.current
    }

    /// Recompute the scale after the hosting container resized.
    ///
    /// An unusable width (container collapsed to or below its padding) is
    /// rejected and the previous scale kept.
    pub fn on_container_resize(&mut self, container_width: f32) -> Result<LayoutScale> {
        let available = container_width - self.gutter;
        let scale = LayoutScale::for_width(available, &self.metrics)?;
        if scale != self.current {
            debug!(
                "Container width {} -> scale {:.4} (was {:.4})",
                container_width,
                scale.value(),
                self.current.value()
            );
        }
        self.current = scale;
        Ok(scale)
    }

    pub fn transform(&self) -> DisplayTransform {
        DisplayTransform::from_scale(self.current)
    }

    /// Outer size the scaled page occupies on screen
    pub fn display_size(&self) -> Size {
        let size = self.metrics.size_px().scaled(self.current.value());
        trace!("Display size {:?}", size);
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_min_of_ratio_and_one() {
        let metrics = PageMetrics::A4;
        for width in [1.0_f32, 120.0, 320.0, 600.5, 793.0, 793.7, 1024.0, 1920.0, 10_000.0] {
            let scale = LayoutScale::for_width(width, &metrics).unwrap();
            let expected = (width / metrics.width_px()).min(1.0);
            assert!((scale.value() - expected).abs() < 1e-6, "width {width}");
            assert!(scale.value() > 0.0 && scale.value() <= 1.0);
            assert!(metrics.width_px() * scale.value() <= width + 1e-3);
        }
    }

    #[test]
    fn test_non_positive_width_rejected() {
        let metrics = PageMetrics::A4;
        assert!(LayoutScale::for_width(0.0, &metrics).is_err());
        assert!(LayoutScale::for_width(-5.0, &metrics).is_err());
        assert!(LayoutScale::for_width(f32::NAN, &metrics).is_err());
    }

    #[test]
    fn test_resize_subtracts_gutter_and_keeps_scale_on_error() {
        let mut scaler = LayoutScaler::new(PageMetrics::A4);
        let scale = scaler.on_container_resize(400.0).unwrap();
        assert!((scale.value() - 360.0 / PageMetrics::A4.width_px()).abs() < 1e-6);

        assert!(scaler.on_container_resize(30.0).is_err());
        assert_eq!(scaler.current(), scale);

        scaler.on_container_resize(2000.0).unwrap();
        assert!(scaler.current().is_native());
        assert!(scaler.transform().is_identity());
    }

    #[test]
    fn test_display_size_tracks_scale() {
        let mut scaler = LayoutScaler::new(PageMetrics::A4).with_gutter(0.0);
        scaler.on_container_resize(396.85).unwrap();
        let size = scaler.display_size();
        assert!((size.width - 396.85).abs() < 0.01);
        assert!((size.height - PageMetrics::A4.height_px() / 2.0).abs() < 0.05);

        let corner = scaler.transform().apply(Point::new(793.7, 0.0));
        assert!((corner.x - 396.85).abs() < 0.01);
    }
}
