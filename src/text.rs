//! Text handling and wrapping utilities

use crate::font::{FontFace, FontSet};
use crate::layout::FaceStyle;
use tracing::trace;

/// Break text into lines that fit within the specified width.
///
/// Explicit newlines are preserved; words longer than a line are split by
/// character.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32, face: &dyn FontFace) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut all_lines = Vec::new();

    for segment in text.split('\n') {
        let words: Vec<&str> = segment.split_whitespace().collect();

        if words.is_empty() {
            all_lines.push(String::new());
            continue;
        }

        let space_width = face.char_width(' ', font_size);
        let mut current_line = String::new();
        let mut current_width: f32 = 0.0;

        for word in words {
            let word_width = face.text_width(word, font_size);

            if current_width > 0.0 && current_width + space_width + word_width > max_width {
                all_lines.push(std::mem::take(&mut current_line));
                current_width = 0.0;
            }

            if word_width <= max_width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                    current_width += space_width;
                }
                current_line.push_str(word);
                current_width += word_width;
                continue;
            }

            // Word wider than the line: emit full-width chunks, keep the tail
            if !current_line.is_empty() {
                all_lines.push(std::mem::take(&mut current_line));
            }
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut split_at = 0;
                let mut accumulated = 0.0;
                for (i, ch) in remaining.char_indices() {
                    let cw = face.char_width(ch, font_size);
                    if accumulated + cw > max_width && split_at > 0 {
                        break;
                    }
                    accumulated += cw;
                    split_at = i + ch.len_utf8();
                }
                let (chunk, rest) = remaining.split_at(split_at);
                if rest.is_empty() {
                    current_line = chunk.to_string();
                    current_width = accumulated;
                } else {
                    all_lines.push(chunk.to_string());
                }
                remaining = rest;
            }
        }

        if !current_line.is_empty() {
            all_lines.push(current_line);
        }
    }

    trace!("Wrapped text into {} lines", all_lines.len());
    all_lines
}

/// A run of text drawn with one face
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub face: FaceStyle,
}

impl Span {
    pub fn regular<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            face: FaceStyle::Regular,
        }
    }

    pub fn bold<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            face: FaceStyle::Bold,
        }
    }
}

/// Part of a wrapped line drawn with one face
#[derive(Debug, Clone, PartialEq)]
pub struct LineFragment {
    pub text: String,
    pub face: FaceStyle,
    /// Offset from the start of the line
    pub x: f32,
    pub width: f32,
}

/// One line of wrapped rich text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLine {
    pub fragments: Vec<LineFragment>,
    pub width: f32,
}

impl WrappedLine {
    /// Concatenated text of all fragments, spaces restored
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut end = 0.0;
        for fragment in &self.fragments {
            if !out.is_empty() && fragment.x > end + 1e-3 {
                out.push(' ');
            }
            out.push_str(&fragment.text);
            end = fragment.x + fragment.width;
        }
        out
    }

    /// Number of word gaps: spaces inside fragments plus spaces between them
    fn gap_count(&self) -> usize {
        let mut gaps = 0;
        let mut end = 0.0;
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 && fragment.x > end + 1e-3 {
                gaps += 1;
            }
            gaps += fragment.text.matches(' ').count();
            end = fragment.x + fragment.width;
        }
        gaps
    }

    /// Spread the slack up to `max_width` evenly over the word gaps.
    ///
    /// Returns the extra advance added to every space. Fragment positions and
    /// widths include it afterwards. Lines without gaps, or already at least
    /// `max_width` wide, are left as they are.
    pub fn justify(&mut self, max_width: f32) -> f32 {
        let slack = max_width - self.width;
        let gaps = self.gap_count();
        if gaps == 0 || slack <= 0.0 {
            return 0.0;
        }
        let spacing = slack / gaps as f32;

        let mut shift = 0.0;
        let mut end = 0.0;
        for (i, fragment) in self.fragments.iter_mut().enumerate() {
            if i > 0 && fragment.x > end + 1e-3 {
                shift += spacing;
            }
            end = fragment.x + fragment.width;
            let inner = fragment.text.matches(' ').count() as f32 * spacing;
            fragment.x += shift;
            fragment.width += inner;
            shift += inner;
        }
        self.width = max_width;
        spacing
    }
}

/// A whitespace-free piece of a span
struct Piece<'a> {
    text: &'a str,
    face: FaceStyle,
    /// Whether whitespace separates this piece from the previous one
    space_before: bool,
}

fn split_pieces(spans: &[Span]) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut pending_space = false;
    for span in spans {
        let mut start = None;
        for (i, ch) in span.text.char_indices() {
            if ch.is_whitespace() {
                if let Some(s) = start.take() {
                    pieces.push(Piece {
                        text: &span.text[s..i],
                        face: span.face,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            pieces.push(Piece {
                text: &span.text[s..],
                face: span.face,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    pieces
}

/// Wrap mixed regular/bold text into lines no wider than `max_width`.
///
/// Pieces not separated by whitespace (e.g. a bold word followed by a
/// regular full stop) stay on the same line.
pub fn wrap_spans(
    spans: &[Span],
    max_width: f32,
    font_size: f32,
    fonts: &FontSet,
) -> Vec<WrappedLine> {
    let pieces = split_pieces(spans);

    // Group glued pieces into words
    let mut words: Vec<Vec<&Piece<'_>>> = Vec::new();
    for piece in &pieces {
        match words.last_mut() {
            Some(word) if !piece.space_before => word.push(piece),
            _ => words.push(vec![piece]),
        }
    }

    let space_width = fonts.regular.char_width(' ', font_size);
    let mut lines = Vec::new();
    let mut line = WrappedLine::default();

    for word in words {
        let word_width: f32 = word
            .iter()
            .map(|p| fonts.face(p.face).text_width(p.text, font_size))
            .sum();

        if !line.fragments.is_empty() && line.width + space_width + word_width > max_width {
            lines.push(std::mem::take(&mut line));
        }

        // Word wider than the line: break it by character
        if word_width > max_width {
            for piece in &word {
                let face = fonts.face(piece.face);
                let mut start = 0;
                let mut chunk_width = 0.0;
                for (i, ch) in piece.text.char_indices() {
                    let cw = face.char_width(ch, font_size);
                    let used = line.width + chunk_width;
                    if used + cw > max_width && used > 0.0 {
                        let chunk = &piece.text[start..i];
                        if !chunk.is_empty() {
                            let width = face.text_width(chunk, font_size);
                            append_glued(&mut line, chunk, piece.face, width);
                        }
                        lines.push(std::mem::take(&mut line));
                        start = i;
                        chunk_width = 0.0;
                    }
                    chunk_width += cw;
                }
                let chunk = &piece.text[start..];
                if !chunk.is_empty() {
                    let width = face.text_width(chunk, font_size);
                    append_glued(&mut line, chunk, piece.face, width);
                }
            }
            continue;
        }

        let mut x = if line.fragments.is_empty() {
            0.0
        } else {
            line.width + space_width
        };
        let mut first = true;
        for piece in word {
            let width = fonts.face(piece.face).text_width(piece.text, font_size);
            match line.fragments.last_mut() {
                // Merge with the previous fragment when the face matches
                Some(last) if last.face == piece.face => {
                    if first {
                        last.text.push(' ');
                    }
                    last.text.push_str(piece.text);
                    last.width = x + width - last.x;
                }
                _ => line.fragments.push(LineFragment {
                    text: piece.text.to_string(),
                    face: piece.face,
                    x,
                    width,
                }),
            }
            x += width;
            first = false;
        }
        line.width = x;
    }

    if !line.fragments.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    trace!("Wrapped {} spans into {} lines", spans.len(), lines.len());
    lines
}

/// Append text directly after the end of the line, without a space
fn append_glued(line: &mut WrappedLine, text: &str, face: FaceStyle, width: f32) {
    match line.fragments.last_mut() {
        Some(last) if last.face == face => {
            last.text.push_str(text);
            last.width += width;
        }
        _ => line.fragments.push(LineFragment {
            text: text.to_string(),
            face,
            x: line.width,
            width,
        }),
    }
    line.width += width;
}
