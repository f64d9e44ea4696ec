//! Styling for the composed letter
//!
//! [`LetterStyle`] is the only place sizes and colors of the letter are
//! decided. Preview and export both lay out through it.

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values should be 0.0-1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a color from 8-bit channels
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Gray color
    pub fn gray(level: f32) -> Self {
        let l = level.clamp(0.0, 1.0);
        Self::rgb(l, l, l)
    }

    /// 8-bit channels, rounded
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Horizontal text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Font size and line height of one kind of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub line_height: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font_size: f32, line_height: f32) -> Self {
        Self {
            font_size,
            line_height,
            color: Color::black(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Sizes, spacing and colors of the letter, in pixel-equivalent units
#[derive(Debug, Clone, PartialEq)]
pub struct LetterStyle {
    pub page_background: Color,

    // Header
    pub logo_size: f32,
    pub header_gap: f32,
    pub company_name: TextStyle,
    pub company_detail: TextStyle,
    pub company_contact: TextStyle,
    pub header_rule_width: f32,
    pub header_padding_bottom: f32,
    pub header_margin_bottom: f32,

    // Title
    pub title: TextStyle,
    pub title_number: TextStyle,
    pub title_margin_bottom: f32,

    // Body
    pub body: TextStyle,
    pub paragraph_gap: f32,
    pub label_column_width: f32,
    pub colon_column_width: f32,
    pub table_row_padding: f32,

    // Footer
    pub footer: TextStyle,
    pub footer_padding_top: f32,
    pub footer_column_width: f32,
    pub signature_area_height: f32,
    pub stamp_size: f32,
    pub placeholder: TextStyle,
    pub placeholder_stroke: Color,
    pub logo_placeholder: TextStyle,
    pub logo_placeholder_stroke: Color,
    pub logo_placeholder_fill: Color,
}

impl Default for LetterStyle {
    fn default() -> Self {
        Self {
            page_background: Color::white(),

            logo_size: 100.0,
            header_gap: 24.0,
            company_name: TextStyle::new(24.0, 30.0),
            company_detail: TextStyle::new(14.0, 19.25),
            company_contact: TextStyle::new(14.0, 19.25).with_color(Color::rgb8(0x1e, 0x40, 0xaf)),
            header_rule_width: 2.0,
            header_padding_bottom: 24.0,
            header_margin_bottom: 24.0,

            title: TextStyle::new(20.0, 28.0),
            title_number: TextStyle::new(16.0, 24.0),
            title_margin_bottom: 24.0,

            body: TextStyle::new(16.0, 24.0),
            paragraph_gap: 12.0,
            label_column_width: 128.0,
            colon_column_width: 16.0,
            table_row_padding: 2.0,

            footer: TextStyle::new(16.0, 24.0),
            footer_padding_top: 16.0,
            footer_column_width: 256.0,
            signature_area_height: 96.0,
            stamp_size: 96.0,
            placeholder: TextStyle::new(12.0, 16.0).with_color(Color::rgb8(0xd1, 0xd5, 0xdb)),
            placeholder_stroke: Color::rgb8(0xd1, 0xd5, 0xdb),
            logo_placeholder: TextStyle::new(10.0, 14.0).with_color(Color::rgb8(0x9c, 0xa3, 0xaf)),
            logo_placeholder_stroke: Color::rgb8(0xe5, 0xe7, 0xeb),
            logo_placeholder_fill: Color::rgb8(0xf9, 0xfa, 0xfb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_clamps_and_converts() {
        let c = Color::rgb(1.5, -0.2, 0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.to_rgb8(), [255, 0, 128]);
        assert_eq!(Color::rgb8(0x1e, 0x40, 0xaf).to_rgb8(), [0x1e, 0x40, 0xaf]);
    }
}
