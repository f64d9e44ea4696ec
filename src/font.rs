//! Font faces for text measurement and glyph outlines

use crate::constants::{
    DEFAULT_ASCENT_RATIO, DEFAULT_CHAR_WIDTH_RATIO, SERIF_BOLD_CHAR_WIDTH_RATIO,
    SERIF_CHAR_WIDTH_RATIO,
};
use crate::layout::FaceStyle;
use std::sync::Arc;
#[cfg(feature = "ttf-parser")]
use tracing::{debug, warn};

/// Well-known locations of a serif regular/bold pair
#[cfg(feature = "ttf-parser")]
const SYSTEM_SERIF_FONTS: [(&str, &str); 4] = [
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
        "/System/Library/Fonts/Supplemental/Times New Roman Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\times.ttf", "C:\\Windows\\Fonts\\timesbd.ttf"),
];

/// Trait for measuring text and, optionally, producing glyph outlines.
///
/// The same face is used to lay text out and to paint it, so measured widths
/// and painted widths always agree.
pub trait FontFace: std::fmt::Debug + Send + Sync {
    /// Width of a single character in pixels at the given font size
    fn char_width(&self, ch: char, font_size: f32) -> f32;

    /// Total width of a string in pixels at the given font size
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Distance from the top of the line box to the baseline
    fn ascent(&self, font_size: f32) -> f32 {
        font_size * DEFAULT_ASCENT_RATIO
    }

    /// Outline of `ch` with the pen at the origin, y growing downwards.
    ///
    /// Faces without outlines return `None`; the rasterizer then paints a
    /// solid block per visible character.
    fn glyph_outline(&self, _ch: char, _font_size: f32) -> Option<tiny_skia::Path> {
        None
    }
}

/// Width-estimating face without outlines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedFace {
    pub char_width_ratio: f32,
}

impl EstimatedFace {
    pub fn new(char_width_ratio: f32) -> Self {
        Self { char_width_ratio }
    }
}

impl Default for EstimatedFace {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_WIDTH_RATIO)
    }
}

impl FontFace for EstimatedFace {
    fn char_width(&self, _ch: char, font_size: f32) -> f32 {
        font_size * self.char_width_ratio
    }
}

/// Regular and bold faces used by one page
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Arc<dyn FontFace>,
    pub bold: Arc<dyn FontFace>,
}

impl FontSet {
    pub fn new(regular: Arc<dyn FontFace>, bold: Arc<dyn FontFace>) -> Self {
        Self { regular, bold }
    }

    /// Estimated serif metrics; bold runs slightly wider
    pub fn estimated() -> Self {
        Self::new(
            Arc::new(EstimatedFace::new(SERIF_CHAR_WIDTH_RATIO)),
            Arc::new(EstimatedFace::new(SERIF_BOLD_CHAR_WIDTH_RATIO)),
        )
    }

    /// Load both faces from TrueType data
    #[cfg(feature = "ttf-parser")]
    pub fn from_ttf(regular: Vec<u8>, bold: Vec<u8>) -> crate::Result<Self> {
        Ok(Self::new(
            Arc::new(TtfFace::new(regular)?),
            Arc::new(TtfFace::new(bold)?),
        ))
    }

    /// First serif pair installed in a well-known system location
    #[cfg(feature = "ttf-parser")]
    pub fn system() -> Option<Self> {
        SYSTEM_SERIF_FONTS.iter().find_map(|(regular, bold)| {
            let regular_data = std::fs::read(regular).ok()?;
            let bold_data = std::fs::read(bold).ok()?;
            match Self::from_ttf(regular_data, bold_data) {
                Ok(fonts) => {
                    debug!("Using system fonts {} / {}", regular, bold);
                    Some(fonts)
                }
                Err(e) => {
                    warn!("Skipping system font {}: {}", regular, e);
                    None
                }
            }
        })
    }

    pub fn face(&self, style: FaceStyle) -> &dyn FontFace {
        match style {
            FaceStyle::Regular => self.regular.as_ref(),
            FaceStyle::Bold => self.bold.as_ref(),
        }
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::estimated()
    }
}

/// TrueType face using ttf-parser for advances and outlines.
///
/// This struct owns the font data and parses it on demand.
#[cfg(feature = "ttf-parser")]
pub struct TtfFace {
    font_data: Vec<u8>,
    units_per_em: f32,
    ascender: f32,
}

#[cfg(feature = "ttf-parser")]
impl TtfFace {
    /// Create a face from raw TTF/TTC font data.
    ///
    /// Validates the font by parsing it and extracting units_per_em.
    pub fn new(font_data: Vec<u8>) -> crate::Result<Self> {
        let face = ttf_parser::Face::parse(&font_data, 0).map_err(|e| {
            crate::error::ExportError::TextError(format!("Failed to parse font: {e}"))
        })?;
        let units_per_em = face.units_per_em() as f32;
        let ascender = face.ascender() as f32;
        Ok(Self {
            font_data,
            units_per_em,
            ascender,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.font_data, 0).ok()
    }
}

#[cfg(feature = "ttf-parser")]
impl FontFace for TtfFace {
    fn char_width(&self, ch: char, font_size: f32) -> f32 {
        self.face()
            .and_then(|face| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
            })
            .map(|advance| advance as f32 / self.units_per_em * font_size)
            .unwrap_or(font_size * DEFAULT_CHAR_WIDTH_RATIO)
    }

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let Some(face) = self.face() else {
            return text.chars().count() as f32 * font_size * DEFAULT_CHAR_WIDTH_RATIO;
        };
        text.chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|advance| advance as f32 / self.units_per_em * font_size)
                    .unwrap_or(font_size * DEFAULT_CHAR_WIDTH_RATIO)
            })
            .sum()
    }

    fn ascent(&self, font_size: f32) -> f32 {
        self.ascender / self.units_per_em * font_size
    }

    fn glyph_outline(&self, ch: char, font_size: f32) -> Option<tiny_skia::Path> {
        let face = self.face()?;
        let glyph_id = face.glyph_index(ch)?;
        let mut builder = OutlineSink {
            scale: font_size / self.units_per_em,
            path: tiny_skia::PathBuilder::new(),
        };
        face.outline_glyph(glyph_id, &mut builder)?;
        builder.path.finish()
    }
}

#[cfg(feature = "ttf-parser")]
impl std::fmt::Debug for TtfFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFace")
            .field("units_per_em", &self.units_per_em)
            .field("font_data_len", &self.font_data.len())
            .finish()
    }
}

/// Scales font units to pixels and flips y so it grows downwards
#[cfg(feature = "ttf-parser")]
struct OutlineSink {
    scale: f32,
    path: tiny_skia::PathBuilder,
}

#[cfg(feature = "ttf-parser")]
impl ttf_parser::OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(x * self.scale, -y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(x * self.scale, -y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.quad_to(
            x1 * self.scale,
            -y1 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path.cubic_to(
            x1 * self.scale,
            -y1 * self.scale,
            x2 * self.scale,
            -y2 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn close(&mut self) {
        self.path.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_face_widths() {
        let face = EstimatedFace::default();
        assert_eq!(face.char_width('A', 10.0), 5.0);
        assert_eq!(face.text_width("ABC", 10.0), 15.0);
        assert!(face.glyph_outline('A', 10.0).is_none());
    }

    #[test]
    fn test_font_set_selects_face() {
        let fonts = FontSet::estimated();
        let regular = fonts.face(FaceStyle::Regular).text_width("Nama", 16.0);
        let bold = fonts.face(FaceStyle::Bold).text_width("Nama", 16.0);
        assert!(bold > regular);
    }

    #[cfg(feature = "ttf-parser")]
    fn load_test_font() -> Option<Vec<u8>> {
        // Try common system font paths
        let paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
            "C:\\Windows\\Fonts\\times.ttf",
        ];
        for path in &paths {
            if let Ok(data) = std::fs::read(path) {
                return Some(data);
            }
        }
        None
    }

    #[cfg(feature = "ttf-parser")]
    #[test]
    fn test_system_fonts_have_outlines() {
        let Some(fonts) = FontSet::system() else {
            eprintln!("Skipping test: no system font found");
            return;
        };
        assert!(fonts.regular.glyph_outline('S', 16.0).is_some());
        assert!(fonts.bold.glyph_outline('S', 16.0).is_some());
        let regular = fonts.face(FaceStyle::Regular).text_width("Nama", 16.0);
        assert!(regular > 0.0);
    }

    #[cfg(feature = "ttf-parser")]
    #[test]
    fn test_ttf_face_invalid_data() {
        let result = TtfFace::new(vec![0, 1, 2, 3]);
        assert!(result.is_err());
    }

    #[cfg(feature = "ttf-parser")]
    #[test]
    fn test_ttf_face_outlines() {
        let Some(font_data) = load_test_font() else {
            eprintln!("Skipping test: no system font found");
            return;
        };
        let face = TtfFace::new(font_data).expect("should parse system font");
        assert!(face.char_width('A', 16.0) > 0.0);
        assert!(face.ascent(16.0) > 0.0);

        let outline = face.glyph_outline('A', 16.0).expect("'A' has an outline");
        let bounds = outline.bounds();
        // Glyph sits above the baseline, so y is negative with y growing down
        assert!(bounds.top() < 0.0);
        assert!(face.glyph_outline(' ', 16.0).is_none());
    }
}
