//! Page layout model and the fixed-height column discipline
//!
//! A composed page is a list of [`Block`]s stacked top to bottom inside the
//! page's content box. Coordinates are pixel-equivalent units with the origin
//! at the top-left corner; elements inside a block are relative to the
//! block's frame.

use crate::Result;
use crate::document::ImageAsset;
use crate::error::ExportError;
use crate::font::FontSet;
use crate::style::Color;
use tracing::{trace, warn};

/// A point in pixel-equivalent units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixel-equivalent units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Uniformly scaled copy
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Whether `other` lies entirely inside this rectangle (with a small tolerance)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Largest rectangle with the given aspect that fits inside, centered
    /// (`object-fit: contain`)
    pub fn fit_contain(&self, content_width: f32, content_height: f32) -> Rect {
        if content_width <= 0.0 || content_height <= 0.0 {
            return *self;
        }
        let scale = (self.width / content_width).min(self.height / content_height);
        let width = content_width * scale;
        let height = content_height * scale;
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// Which face of the [`FontSet`] a run is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceStyle {
    #[default]
    Regular,
    Bold,
}

/// A single line of text positioned at its baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left end of the baseline
    pub origin: Point,
    pub text: String,
    pub font_size: f32,
    pub face: FaceStyle,
    pub italic: bool,
    pub color: Color,
    pub underline: bool,
    /// Measured advance width of `text`, word spacing included
    pub width: f32,
    /// Extra advance after every space, for justified lines
    pub word_spacing: f32,
}

/// How an element is composited onto what is already painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    /// Darken-only: white source pixels leave the page untouched
    Multiply,
}

/// A raster image drawn into `rect`, rotated about the rect's center
#[derive(Debug, Clone)]
pub struct ImageElement {
    pub asset: ImageAsset,
    pub rect: Rect,
    pub rotation_deg: f32,
    pub opacity: f32,
    pub blend: Blend,
}

/// Outline shape of an empty-state placeholder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    Rounded(f32),
    Ellipse,
}

/// Dashed empty-state box shown where an optional image is missing
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderElement {
    pub rect: Rect,
    pub outline: Outline,
    pub stroke: Color,
    pub stroke_width: f32,
    pub fill: Option<Color>,
}

/// Anything the rasterizer can paint
#[derive(Debug, Clone)]
pub enum Element {
    Fill { rect: Rect, color: Color },
    Text(TextRun),
    Image(ImageElement),
    Placeholder(PlaceholderElement),
}

impl Element {
    /// Bounding box of the element in its block's coordinates
    pub fn bounds(&self) -> Rect {
        match self {
            Element::Fill { rect, .. } => *rect,
            Element::Text(run) => Rect::new(
                run.origin.x,
                run.origin.y - run.font_size,
                run.width,
                run.font_size * 1.25,
            ),
            Element::Image(image) => image.rect,
            Element::Placeholder(placeholder) => placeholder.rect,
        }
    }
}

/// Sections of the letter, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Title,
    Body,
    Footer,
}

/// A positioned section of the page
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    /// Frame in page coordinates
    pub frame: Rect,
    /// Height the content would need without clipping
    pub content_height: f32,
    /// Whether painting is clipped to `frame`
    pub clip: bool,
    /// Elements relative to `frame`'s top-left corner
    pub elements: Vec<Element>,
}

impl Block {
    /// Whether the content is taller than the frame and gets cut off
    pub fn overflows(&self) -> bool {
        self.content_height > self.frame.height + 1e-3
    }
}

/// Fully composed page at native (unscaled) size
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub size: Size,
    /// Area inside the page margins
    pub content_box: Rect,
    pub background: Color,
    pub fonts: FontSet,
    pub blocks: Vec<Block>,
}

impl PageLayout {
    pub fn block(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    /// Whether every block frame lies inside the page bounds
    pub fn fits_page(&self) -> bool {
        let page = Rect::from_size(self.size);
        self.blocks.iter().all(|b| page.contains_rect(&b.frame))
    }
}

/// One entry of a fixed-height column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnItem {
    pub height: f32,
    /// Flexible items take whatever height the fixed items leave over
    pub flexible: bool,
    pub margin_after: f32,
}

impl ColumnItem {
    pub fn fixed(height: f32, margin_after: f32) -> Self {
        Self {
            height,
            flexible: false,
            margin_after,
        }
    }

    pub fn flexible(margin_after: f32) -> Self {
        Self {
            height: 0.0,
            flexible: true,
            margin_after,
        }
    }
}

/// Stack items inside a container of fixed total height.
///
/// The single flexible item receives the height left over by the fixed items
/// (never negative). Items after it are pinned against the bottom of the
/// container and are laid out first, so a tall flexible item can never push
/// them out. Fixed items before the flexible one are cut to the space above
/// the pinned tail; frames never leave the container.
pub fn stack_fixed_column(container: Rect, items: &[ColumnItem]) -> Result<Vec<Rect>> {
    let flexible_count = items.iter().filter(|i| i.flexible).count();
    if flexible_count > 1 {
        return Err(ExportError::DimensionError(format!(
            "Column has {} flexible items, at most one is allowed",
            flexible_count
        )));
    }

    let split = items.iter().position(|i| i.flexible).unwrap_or(items.len());

    // Bottom-up for the pinned tail
    let mut tail = Vec::new();
    let mut bottom = container.bottom();
    if split < items.len() {
        for item in items[split + 1..].iter().rev() {
            bottom = (bottom - item.margin_after).max(container.y);
            let height = item.height.min(bottom - container.y);
            tail.push(Rect::new(
                container.x,
                bottom - height,
                container.width,
                height,
            ));
            bottom -= height;
        }
        tail.reverse();
    }

    // Top-down until the flexible item, cut at the top of the tail
    let mut frames = Vec::with_capacity(items.len());
    let mut y = container.y;
    for item in &items[..split] {
        let height = item.height.min((bottom - y).max(0.0));
        if height < item.height {
            warn!(
                "Fixed block cut from {:.1}px to {:.1}px to keep the column on the page",
                item.height, height
            );
        }
        frames.push(Rect::new(container.x, y, container.width, height));
        y = (y + height + item.margin_after).min(bottom);
    }

    if split < items.len() {
        let flexible_height = (bottom - y - items[split].margin_after).max(0.0);
        if flexible_height == 0.0 {
            warn!("No room left for the flexible block, collapsed");
        }
        frames.push(Rect::new(container.x, y, container.width, flexible_height));
        frames.extend(tail);
    }

    trace!("Stacked column frames: {:?}", frames);
    Ok(frames)
}
