//! Captures an isolated snapshot into a bitmap
//!
//! The bitmap size depends only on the snapshot's pinned size and the
//! oversampling factor. Painting is deterministic: the same snapshot always
//! produces the same pixels.

use crate::Result;
use crate::constants::{DEFAULT_OVERSAMPLING, GREEK_HEIGHT_RATIO};
use crate::document::AssetOrigin;
use crate::error::ExportError;
use crate::font::FontSet;
use crate::layout::{Block, Element, ImageElement, PlaceholderElement, Rect, TextRun};
use crate::paint::{asset_pixmap, blend_mode, outline_path, skia_rect, solid_paint};
use crate::snapshot::Snapshot;
use crate::style::Color;
use tiny_skia::{
    FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash, Transform,
};
use tracing::{debug, instrument, trace, warn};

/// Horizontal shear of synthesized italics
const ITALIC_SKEW: f32 = -0.2;

/// Dash pattern of placeholder outlines, in pixel-equivalent units
const PLACEHOLDER_DASH: [f32; 2] = [4.0, 3.0];

/// Opaque RGBA raster of a captured page
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// RGBA of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Packed 8-bit RGB rows, top to bottom
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width() as usize * self.height() as usize * 3);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            rgb.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        }
        rgb
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| ExportError::CaptureError(format!("Failed to encode PNG: {e}")))
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Paints snapshots at a fixed oversampling factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    oversampling: f32,
    allow_remote_assets: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            oversampling: DEFAULT_OVERSAMPLING,
            allow_remote_assets: true,
        }
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bitmap pixels per pixel-equivalent unit
    pub fn with_oversampling(mut self, oversampling: f32) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// Whether images of remote origin are painted or left out
    pub fn with_remote_assets(mut self, allow: bool) -> Self {
        self.allow_remote_assets = allow;
        self
    }

    pub fn oversampling(&self) -> f32 {
        self.oversampling
    }

    /// Paint `snapshot` onto an opaque white bitmap
    #[instrument(skip_all, fields(oversampling = self.oversampling))]
    pub fn capture(&self, snapshot: &Snapshot) -> Result<Bitmap> {
        if !self.oversampling.is_finite() || self.oversampling <= 0.0 {
            return Err(ExportError::DimensionError(format!(
                "Oversampling must be positive, got {}",
                self.oversampling
            )));
        }
        if !snapshot.presentation().is_native() {
            return Err(ExportError::CaptureError(
                "Snapshot still carries screen presentation".to_string(),
            ));
        }

        let width = (snapshot.width() * self.oversampling).round() as u32;
        let height = (snapshot.height() * self.oversampling).round() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::CaptureError(format!("Failed to create pixmap {}x{}", width, height))
        })?;

        pixmap.fill(tiny_skia::Color::WHITE);
        let page = snapshot.page();
        let base = Transform::from_scale(self.oversampling, self.oversampling);
        if page.background != Color::white() {
            if let Some(rect) = skia_rect(Rect::from_size(snapshot.size())) {
                pixmap.fill_rect(rect, &solid_paint(page.background), base, None);
            }
        }

        for block in &page.blocks {
            self.paint_block(&mut pixmap, block, &page.fonts, base)?;
        }

        debug!("Captured bitmap {}x{}", width, height);
        Ok(Bitmap { pixmap })
    }

    fn paint_block(
        &self,
        pixmap: &mut Pixmap,
        block: &Block,
        fonts: &FontSet,
        base: Transform,
    ) -> Result<()> {
        let transform = base.pre_translate(block.frame.x, block.frame.y);

        let mask = if block.clip {
            if block.frame.width <= 0.0 || block.frame.height <= 0.0 {
                trace!("Skipping collapsed {:?} block", block.kind);
                return Ok(());
            }
            let mut mask = Mask::new(pixmap.width(), pixmap.height()).ok_or_else(|| {
                ExportError::CaptureError("Failed to create clip mask".to_string())
            })?;
            let clip_rect = Rect::new(0.0, 0.0, block.frame.width, block.frame.height);
            if let Some(rect) = skia_rect(clip_rect) {
                mask.fill_path(&PathBuilder::from_rect(rect), FillRule::Winding, true, transform);
            }
            Some(mask)
        } else {
            None
        };

        trace!(
            "Painting {:?} block with {} elements",
            block.kind,
            block.elements.len()
        );
        for element in &block.elements {
            match element {
                Element::Fill { rect, color } => {
                    if let Some(rect) = skia_rect(*rect) {
                        pixmap.fill_rect(rect, &solid_paint(*color), transform, mask.as_ref());
                    }
                }
                Element::Text(run) => paint_text(pixmap, run, fonts, transform, mask.as_ref()),
                Element::Image(image) => self.paint_image(pixmap, image, transform, mask.as_ref())?,
                Element::Placeholder(placeholder) => {
                    paint_placeholder(pixmap, placeholder, transform, mask.as_ref())
                }
            }
        }
        Ok(())
    }

    fn paint_image(
        &self,
        pixmap: &mut Pixmap,
        image: &ImageElement,
        transform: Transform,
        mask: Option<&Mask>,
    ) -> Result<()> {
        if image.asset.origin == AssetOrigin::Remote && !self.allow_remote_assets {
            warn!("Leaving out remote image {:?}", image.asset);
            return Ok(());
        }
        let source = asset_pixmap(&image.asset)?;
        let rect = image.rect;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(());
        }

        let center = rect.center();
        let image_transform = transform
            .pre_concat(Transform::from_rotate_at(
                image.rotation_deg,
                center.x,
                center.y,
            ))
            .pre_translate(rect.x, rect.y)
            .pre_scale(
                rect.width / source.width() as f32,
                rect.height / source.height() as f32,
            );

        let paint = PixmapPaint {
            opacity: image.opacity.clamp(0.0, 1.0),
            blend_mode: blend_mode(image.blend),
            quality: FilterQuality::Bilinear,
        };
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, image_transform, mask);
        Ok(())
    }
}

/// Glyph outlines where the face has them, greeked blocks otherwise
fn paint_text(
    pixmap: &mut Pixmap,
    run: &TextRun,
    fonts: &FontSet,
    transform: Transform,
    mask: Option<&Mask>,
) {
    let face = fonts.face(run.face);
    let paint = solid_paint(run.color);
    let skew = if run.italic {
        Transform::from_row(1.0, 0.0, ITALIC_SKEW, 1.0, 0.0, 0.0)
    } else {
        Transform::identity()
    };

    let mut pen = run.origin.x;
    for ch in run.text.chars() {
        let advance = face.char_width(ch, run.font_size);
        let glyph_transform = transform
            .pre_translate(pen, run.origin.y)
            .pre_concat(skew);

        if let Some(path) = face.glyph_outline(ch, run.font_size) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, glyph_transform, mask);
        } else if !ch.is_whitespace() {
            let height = run.font_size * GREEK_HEIGHT_RATIO;
            let greek = Rect::new(advance * 0.1, -height, advance * 0.8, height);
            if let Some(rect) = skia_rect(greek) {
                pixmap.fill_rect(rect, &paint, glyph_transform, mask);
            }
        }
        pen += advance;
        if ch == ' ' {
            pen += run.word_spacing;
        }
    }

    if run.underline {
        let thickness = (run.font_size / 16.0).max(1.0);
        let underline = Rect::new(
            run.origin.x,
            run.origin.y + run.font_size * 0.1,
            run.width,
            thickness,
        );
        if let Some(rect) = skia_rect(underline) {
            pixmap.fill_rect(rect, &paint, transform, mask);
        }
    }
}

fn paint_placeholder(
    pixmap: &mut Pixmap,
    placeholder: &PlaceholderElement,
    transform: Transform,
    mask: Option<&Mask>,
) {
    let Some(path) = outline_path(placeholder.rect, placeholder.outline) else {
        return;
    };
    if let Some(fill) = placeholder.fill {
        pixmap.fill_path(&path, &solid_paint(fill), FillRule::Winding, transform, mask);
    }

    let paint = solid_paint(placeholder.stroke);
    let stroke = Stroke {
        width: placeholder.stroke_width,
        dash: StrokeDash::new(PLACEHOLDER_DASH.to_vec(), 0.0),
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, mask);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::DocumentComposer;
    use crate::document::{AssetKind, AssetSet, Document, ImageAsset};
    use crate::layout::{BlockKind, PageLayout};
    use crate::metrics::PageMetrics;
    use crate::snapshot::{OffscreenHost, SnapshotIsolator};
    use image::{Rgba, RgbaImage};

    const OVERSAMPLING: f32 = 2.0;

    fn capture(page: &PageLayout) -> Bitmap {
        let host = OffscreenHost::new();
        let snapshot = SnapshotIsolator::default().isolate(&host, page).unwrap();
        Rasterizer::default().capture(&snapshot).unwrap()
    }

    fn compose(document: &Document, assets: &AssetSet) -> PageLayout {
        DocumentComposer::default().compose(document, assets).unwrap()
    }

    /// Bitmap pixel at a page coordinate
    fn sample(bitmap: &Bitmap, x: f32, y: f32) -> [u8; 4] {
        bitmap
            .pixel((x * OVERSAMPLING) as u32, (y * OVERSAMPLING) as u32)
            .unwrap()
    }

    #[test]
    fn test_bitmap_size_is_fixed() {
        let bitmap = capture(&compose(&Document::default(), &AssetSet::default()));
        assert_eq!(
            (bitmap.width(), bitmap.height()),
            PageMetrics::A4.bitmap_size(OVERSAMPLING)
        );
        assert_eq!((bitmap.width(), bitmap.height()), (1587, 2245));
    }

    #[test]
    fn test_background_is_opaque_white() {
        let bitmap = capture(&compose(&Document::default(), &AssetSet::default()));
        assert_eq!(bitmap.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(
            bitmap.pixel(bitmap.width() - 1, bitmap.height() - 1),
            Some([255, 255, 255, 255])
        );
        assert_eq!(
            bitmap.to_rgb_bytes().len(),
            bitmap.width() as usize * bitmap.height() as usize * 3
        );
    }

    #[test]
    fn test_capture_is_deterministic() {
        let page = compose(&Document::default(), &AssetSet::default());
        let first = capture(&page);
        let second = capture(&page);
        assert!(first.to_rgb_bytes() == second.to_rgb_bytes());
    }

    #[cfg(feature = "ttf-parser")]
    #[test]
    fn test_ttf_text_is_drawn_from_outlines() {
        let Some(fonts) = FontSet::system() else {
            eprintln!("Skipping test: no system font found");
            return;
        };
        let page = DocumentComposer::default()
            .with_fonts(fonts)
            .compose(&Document::default(), &AssetSet::default())
            .unwrap();
        let title = page.block(BlockKind::Title).unwrap();
        let run = title
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Text(run) => Some(run),
                _ => None,
            })
            .unwrap();
        let left = title.frame.x + run.origin.x;
        let baseline = title.frame.y + run.origin.y;
        let size = run.font_size;

        let bitmap = capture(&page);
        let ink_between = |top: f32, bottom: f32| {
            let mut dark = 0;
            let mut y = top;
            while y < bottom {
                let mut x = left;
                while x < left + run.width {
                    if sample(&bitmap, x, y)[0] < 128 {
                        dark += 1;
                    }
                    x += 0.5;
                }
                y += 0.5;
            }
            dark
        };

        // Capitals reach above the half-size band greeked blocks fill
        assert!(ink_between(baseline - size * 0.62, baseline - size * 0.56) > 0);
        assert!(ink_between(baseline - size * 0.4, baseline) > 0);
        // Nothing above the line box
        assert_eq!(ink_between(baseline - size * 1.2, baseline - size * 1.0), 0);
    }

    #[test]
    fn test_overflowing_body_is_clipped() {
        let mut document = Document::default();
        document.purpose = "administrasi ".repeat(400);
        let page = compose(&document, &AssetSet::default());
        let body = page.block(BlockKind::Body).unwrap();
        let footer = page.block(BlockKind::Footer).unwrap();
        assert!(body.overflows());

        let bitmap = capture(&page);
        // Empty band at the top of the footer stays white
        let y = footer.frame.y + 4.0;
        for x in (page.content_box.x as u32..page.content_box.right() as u32).step_by(8) {
            assert_eq!(sample(&bitmap, x as f32, y), [255, 255, 255, 255], "x {x}");
        }
        // Footer itself is painted inside the page
        assert!(footer.frame.bottom() <= page.size.height);
    }

    #[test]
    fn test_stamp_is_rotated_and_blended_under_signature() {
        let stamp = ImageAsset::new(RgbaImage::from_pixel(60, 60, Rgba([220, 0, 0, 255])));
        let signature =
            ImageAsset::new(RgbaImage::from_pixel(300, 100, Rgba([255, 255, 255, 255])));
        let assets = AssetSet::new()
            .with(AssetKind::Stamp, stamp)
            .with(AssetKind::Signature, signature);
        let page = compose(&Document::default(), &assets);
        let footer = page.block(BlockKind::Footer).unwrap();
        let stamp_rect = footer
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Image(image) if image.rotation_deg != 0.0 => Some(image.rect),
                _ => None,
            })
            .unwrap()
            .translate(footer.frame.x, footer.frame.y);

        let bitmap = capture(&page);

        // White signature on top does not hide the stamp, and the page shows
        // through the partially transparent stamp
        let center = sample(&bitmap, stamp_rect.center().x, stamp_rect.center().y);
        assert!(center[0] > 200, "{center:?}");
        assert!(center[1] > 40 && center[1] < 120, "{center:?}");
        assert!(center[1] == center[2]);

        // Unrotated corner lies outside the rotated stamp
        let corner = sample(&bitmap, stamp_rect.x + 2.0, stamp_rect.y + 2.0);
        assert_eq!(corner, [255, 255, 255, 255]);
    }

    #[test]
    fn test_signature_placeholder_painted_without_assets() {
        let page = compose(&Document::default(), &AssetSet::default());
        let footer = page.block(BlockKind::Footer).unwrap();
        let area = footer
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Placeholder(p) => Some(p.rect),
                _ => None,
            })
            .unwrap()
            .translate(footer.frame.x, footer.frame.y);

        let bitmap = capture(&page);
        let inked = (0..area.height as u32).any(|dy| {
            sample(&bitmap, area.x + 0.25, area.y + dy as f32) != [255, 255, 255, 255]
        });
        assert!(inked);
    }

    #[test]
    fn test_remote_assets_skipped_when_disallowed() {
        let stamp = ImageAsset::new(RgbaImage::from_pixel(60, 60, Rgba([0, 0, 0, 255])))
            .with_origin(AssetOrigin::Remote);
        let assets = AssetSet::new().with(AssetKind::Stamp, stamp);
        let page = compose(&Document::default(), &assets);
        let footer = page.block(BlockKind::Footer).unwrap();
        let rect = footer
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Image(image) => Some(image.rect),
                _ => None,
            })
            .unwrap()
            .translate(footer.frame.x, footer.frame.y);

        let host = OffscreenHost::new();
        let snapshot = SnapshotIsolator::default().isolate(&host, &page).unwrap();
        let allowed = Rasterizer::default().capture(&snapshot).unwrap();
        let denied = Rasterizer::default()
            .with_remote_assets(false)
            .capture(&snapshot)
            .unwrap();

        // Above the placeholder label, still inside the rotated stamp
        let center = rect.center();
        let (x, y) = (center.x, center.y - 20.0);
        assert_ne!(sample(&allowed, x, y), [255, 255, 255, 255]);
        assert_eq!(sample(&denied, x, y), [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_oversampling_rejected() {
        let page = compose(&Document::default(), &AssetSet::default());
        let host = OffscreenHost::new();
        let snapshot = SnapshotIsolator::default().isolate(&host, &page).unwrap();
        assert!(Rasterizer::new().with_oversampling(0.0).capture(&snapshot).is_err());
    }
}
