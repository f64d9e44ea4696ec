//! Conversions from layout types to tiny-skia primitives

use crate::Result;
use crate::document::ImageAsset;
use crate::error::ExportError;
use crate::layout::{Blend, Outline, Rect};
use crate::style::Color;
use tiny_skia::{BlendMode, IntSize, Paint, Path, PathBuilder, Pixmap};

pub(crate) fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(color.r, color.g, color.b, 1.0).unwrap_or(tiny_skia::Color::BLACK)
}

/// Anti-aliased solid paint
pub(crate) fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

pub(crate) fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

pub(crate) fn blend_mode(blend: Blend) -> BlendMode {
    match blend {
        Blend::Normal => BlendMode::SourceOver,
        Blend::Multiply => BlendMode::Multiply,
    }
}

/// Path of a placeholder outline
pub(crate) fn outline_path(rect: Rect, outline: Outline) -> Option<Path> {
    let bounds = skia_rect(rect)?;
    match outline {
        Outline::Ellipse => PathBuilder::from_oval(bounds),
        Outline::Rounded(radius) => {
            let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
            if r == 0.0 {
                return Some(PathBuilder::from_rect(bounds));
            }
            let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
            let mut pb = PathBuilder::new();
            pb.move_to(left + r, top);
            pb.line_to(right - r, top);
            pb.quad_to(right, top, right, top + r);
            pb.line_to(right, bottom - r);
            pb.quad_to(right, bottom, right - r, bottom);
            pb.line_to(left + r, bottom);
            pb.quad_to(left, bottom, left, bottom - r);
            pb.line_to(left, top + r);
            pb.quad_to(left, top, left + r, top);
            pb.close();
            pb.finish()
        }
    }
}

/// Copy an asset into a premultiplied pixmap
pub(crate) fn asset_pixmap(asset: &ImageAsset) -> Result<Pixmap> {
    let (width, height) = (asset.width(), asset.height());
    let size = IntSize::from_wh(width, height).ok_or_else(|| {
        ExportError::CaptureError(format!("Image has unusable size {}x{}", width, height))
    })?;

    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for pixel in asset.pixels.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        data.push((r as f32 * alpha).round() as u8);
        data.push((g as f32 * alpha).round() as u8);
        data.push((b as f32 * alpha).round() as u8);
        data.push(a);
    }

    Pixmap::from_vec(data, size).ok_or_else(|| {
        ExportError::CaptureError(format!("Failed to create {}x{} image pixmap", width, height))
    })
}
