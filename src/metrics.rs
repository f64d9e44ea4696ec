//! Fixed physical page geometry
//!
//! Both the on-screen layout and the export capture read their page size from
//! [`PageMetrics`], so the two paths always agree on geometry.

use crate::constants::*;
use crate::layout::{Rect, Size};

/// Convert millimetres to pixel-equivalent units at the reference density
pub const fn mm_to_px(mm: f32) -> f32 {
    mm / MM_PER_INCH * REFERENCE_DPI
}

/// Convert millimetres to PDF points
pub const fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Page margins in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Margins of the letter: 25mm on three sides, 20mm at the bottom
    pub const LETTER: Margins = Margins {
        top: PAGE_MARGIN_MM,
        right: PAGE_MARGIN_MM,
        bottom: PAGE_MARGIN_BOTTOM_MM,
        left: PAGE_MARGIN_MM,
    };
}

/// Physical page description in print and pixel-equivalent units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margins_mm: Margins,
}

impl PageMetrics {
    /// A4 portrait with the letter margins
    pub const A4: PageMetrics = PageMetrics {
        width_mm: A4_WIDTH_MM,
        height_mm: A4_HEIGHT_MM,
        margins_mm: Margins::LETTER,
    };

    /// Page width in pixel-equivalent units (96 per inch)
    pub const fn width_px(&self) -> f32 {
        mm_to_px(self.width_mm)
    }

    /// Page height in pixel-equivalent units (96 per inch)
    pub const fn height_px(&self) -> f32 {
        mm_to_px(self.height_mm)
    }

    pub fn size_px(&self) -> Size {
        Size::new(self.width_px(), self.height_px())
    }

    /// Page size in PDF points
    pub fn size_pt(&self) -> Size {
        Size::new(mm_to_pt(self.width_mm), mm_to_pt(self.height_mm))
    }

    /// The area inside the margins, in pixel-equivalent units
    pub fn content_box(&self) -> Rect {
        let m = self.margins_mm;
        let left = mm_to_px(m.left);
        let top = mm_to_px(m.top);
        Rect::new(
            left,
            top,
            self.width_px() - left - mm_to_px(m.right),
            self.height_px() - top - mm_to_px(m.bottom),
        )
    }

    /// Pixel dimensions of a capture at the given oversampling factor
    pub fn bitmap_size(&self, oversampling: f32) -> (u32, u32) {
        (
            (self.width_px() * oversampling).round() as u32,
            (self.height_px() * oversampling).round() as u32,
        )
    }
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self::A4
    }
}
