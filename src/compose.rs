//! Composition of the letter into a fixed-size page
//!
//! Header, title and footer keep their natural height. The body is the only
//! flexible block: it receives what is left of the page's fixed height and
//! anything longer is clipped, so the signature block always stays on the
//! page. Every block clips to its frame; an oversized header or title is cut
//! above the footer instead of painting over it. The same policy applies to
//! the preview and to the export capture because both use the
//! [`PageLayout`] produced here.

use crate::Result;
use crate::constants::{STAMP_OPACITY, STAMP_ROTATION_DEG};
use crate::document::{AssetSet, Document, ImageAsset};
use crate::font::FontSet;
use crate::layout::{
    Blend, Block, BlockKind, ColumnItem, Element, FaceStyle, ImageElement, Outline, PageLayout,
    PlaceholderElement, Point, Rect, TextRun, stack_fixed_column,
};
use crate::metrics::PageMetrics;
use crate::style::{Alignment, LetterStyle, TextStyle};
use crate::text::{Span, WrappedLine, wrap_spans, wrap_text};
use tracing::{debug, instrument, trace, warn};

/// Letter heading
pub const LETTER_TITLE: &str = "SURAT KETERANGAN KERJA";

/// Label of the empty signature area
pub const SIGNATURE_PLACEHOLDER: &str = "(Tanda Tangan)";

/// Label of the empty logo box
pub const LOGO_PLACEHOLDER: &str = "Logo";

/// Elements of one block plus the height they occupy
#[derive(Debug, Default)]
struct Section {
    elements: Vec<Element>,
    height: f32,
}

impl Section {
    fn gap(&mut self, amount: f32) {
        self.height += amount;
    }
}

/// Lays a [`Document`] and its [`AssetSet`] out on the page
#[derive(Debug, Clone)]
pub struct DocumentComposer {
    pub metrics: PageMetrics,
    pub style: LetterStyle,
    pub fonts: FontSet,
}

impl DocumentComposer {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            style: LetterStyle::default(),
            fonts: FontSet::default(),
        }
    }

    pub fn with_style(mut self, style: LetterStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    /// Compose the page at native size
    #[instrument(skip_all, fields(recipient = %document.recipient_name))]
    pub fn compose(&self, document: &Document, assets: &AssetSet) -> Result<PageLayout> {
        let content = self.metrics.content_box();
        let width = content.width;

        let header = self.header(document, assets.company_logo.as_ref(), width);
        let title = self.title(document, width);
        let body = self.body(document, width);
        let footer = self.footer(document, assets, width);

        let frames = stack_fixed_column(
            content,
            &[
                ColumnItem::fixed(header.height, self.style.header_margin_bottom),
                ColumnItem::fixed(title.height, self.style.title_margin_bottom),
                ColumnItem::flexible(0.0),
                ColumnItem::fixed(footer.height, 0.0),
            ],
        )?;

        let blocks = vec![
            block(BlockKind::Header, frames[0], header),
            block(BlockKind::Title, frames[1], title),
            block(BlockKind::Body, frames[2], body),
            block(BlockKind::Footer, frames[3], footer),
        ];

        for block in blocks.iter().filter(|b| b.overflows()) {
            warn!(
                "{:?} needs {:.1}px but only {:.1}px fit, clipping",
                block.kind, block.content_height, block.frame.height
            );
        }
        debug!(
            "Composed page: body {:.1}px of {:.1}px, footer at {:.1}",
            blocks[2].content_height,
            blocks[2].frame.height,
            blocks[3].frame.y
        );

        Ok(PageLayout {
            size: self.metrics.size_px(),
            content_box: content,
            background: self.style.page_background,
            fonts: self.fonts.clone(),
            blocks,
        })
    }

    fn header(&self, document: &Document, logo: Option<&ImageAsset>, width: f32) -> Section {
        let style = &self.style;
        let text_x = style.logo_size + style.header_gap;
        let text_width = (width - text_x).max(0.0);

        // Company identity column, laid out from 0 and shifted once the row
        // height is known
        let mut column = Section::default();
        self.lines(
            &mut column,
            &document.company_name.to_uppercase(),
            text_x,
            text_width,
            &style.company_name,
            FaceStyle::Bold,
            Alignment::Center,
            false,
        );
        column.gap(4.0);
        self.lines(
            &mut column,
            &document.company_address,
            text_x,
            text_width,
            &style.company_detail,
            FaceStyle::Regular,
            Alignment::Center,
            false,
        );
        column.gap(4.0);
        self.lines(
            &mut column,
            &document.company_contact,
            text_x,
            text_width,
            &style.company_contact,
            FaceStyle::Regular,
            Alignment::Center,
            true,
        );

        let row_height = column.height.max(style.logo_size);
        let mut section = Section::default();

        let logo_box = Rect::new(
            0.0,
            (row_height - style.logo_size) / 2.0,
            style.logo_size,
            style.logo_size,
        );
        match logo {
            Some(asset) => section.elements.push(Element::Image(ImageElement {
                rect: logo_box.fit_contain(asset.width() as f32, asset.height() as f32),
                asset: asset.clone(),
                rotation_deg: 0.0,
                opacity: 1.0,
                blend: Blend::Normal,
            })),
            None => {
                section
                    .elements
                    .push(Element::Placeholder(PlaceholderElement {
                        rect: logo_box,
                        outline: Outline::Ellipse,
                        stroke: style.logo_placeholder_stroke,
                        stroke_width: 2.0,
                        fill: Some(style.logo_placeholder_fill),
                    }));
                let label = &style.logo_placeholder;
                section.elements.push(Element::Text(self.run(
                    LOGO_PLACEHOLDER,
                    logo_box,
                    logo_box.y + (logo_box.height - label.line_height) / 2.0,
                    label,
                    FaceStyle::Regular,
                    Alignment::Center,
                )));
            }
        }

        let column_offset = (row_height - column.height) / 2.0;
        section.elements.extend(
            column
                .elements
                .into_iter()
                .map(|e| offset_element(e, 0.0, column_offset)),
        );

        section.height = row_height + style.header_padding_bottom;
        section.elements.push(Element::Fill {
            rect: Rect::new(0.0, section.height, width, style.header_rule_width),
            color: style.company_name.color,
        });
        section.height += style.header_rule_width;
        section
    }

    fn title(&self, document: &Document, width: f32) -> Section {
        let mut section = Section::default();
        self.lines(
            &mut section,
            LETTER_TITLE,
            0.0,
            width,
            &self.style.title,
            FaceStyle::Bold,
            Alignment::Center,
            true,
        );
        section.gap(4.0);
        self.lines(
            &mut section,
            &format!("No. {}", document.letter_number),
            0.0,
            width,
            &self.style.title_number,
            FaceStyle::Regular,
            Alignment::Center,
            false,
        );
        section
    }

    fn body(&self, document: &Document, width: f32) -> Section {
        let gap = self.style.paragraph_gap;
        let mut section = Section::default();

        self.paragraph(
            &mut section,
            &[Span::regular("Saya yang bertanda tangan dibawah ini:")],
            width,
        );
        section.gap(gap);
        self.identity_table(
            &mut section,
            &[
                ("Nama", Span::bold(document.issuer_name.as_str())),
                (
                    "Jabatan",
                    Span::regular(format!("{} {}", document.issuer_job, document.company_name)),
                ),
                ("Alamat", Span::regular(document.issuer_address.as_str())),
            ],
            width,
        );
        section.gap(gap);
        self.paragraph(
            &mut section,
            &[Span::regular("Dengan ini menerangkan bahwa:")],
            width,
        );
        section.gap(gap);
        self.identity_table(
            &mut section,
            &[
                ("Nama", Span::bold(document.recipient_name.as_str())),
                ("Jabatan", Span::regular(document.recipient_job.as_str())),
                ("Alamat", Span::regular(document.recipient_address.as_str())),
            ],
            width,
        );
        section.gap(gap);
        self.paragraph(
            &mut section,
            &[
                Span::regular("Benar-benar karyawan tetap di "),
                Span::bold(document.company_name.as_str()),
                Span::regular(" yang bekerja sampai saat ini dengan jabatan terakhir sebagai "),
                Span::bold(document.recipient_job.as_str()),
                Span::regular("."),
            ],
            width,
        );
        section.gap(gap);
        self.paragraph(
            &mut section,
            &[
                Span::regular("Surat Keterangan Kerja ini diterbitkan untuk keperluan: "),
                Span::bold(document.purpose.as_str()),
                Span::regular(format!(" oleh saudari {}.", document.recipient_name)),
            ],
            width,
        );
        section.gap(gap);
        self.paragraph(
            &mut section,
            &[Span::regular(
                "Demikian surat keterangan ini dibuat agar dapat dipergunakan sebagaimana mestinya.",
            )],
            width,
        );
        section
    }

    fn footer(&self, document: &Document, assets: &AssetSet, width: f32) -> Section {
        let style = &self.style;
        let column_width = style.footer_column_width.min(width);
        let x = width - column_width;
        let text = &style.footer;

        let mut section = Section::default();
        section.gap(style.footer_padding_top);

        self.lines(
            &mut section,
            &format!("{}, {}", document.letter_place, document.formatted_date()),
            x,
            column_width,
            text,
            FaceStyle::Regular,
            Alignment::Center,
            false,
        );
        section.gap(16.0);
        self.lines(
            &mut section,
            &document.issuer_job,
            x,
            column_width,
            text,
            FaceStyle::Bold,
            Alignment::Center,
            false,
        );
        section.gap(4.0);
        self.lines(
            &mut section,
            &document.company_name,
            x,
            column_width,
            text,
            FaceStyle::Bold,
            Alignment::Center,
            false,
        );
        section.gap(16.0);

        let area = Rect::new(x, section.height, column_width, style.signature_area_height);
        self.signature_area(&mut section.elements, area, assets);
        section.gap(area.height + 8.0);

        // Issuer name, underlined by a 1px border with 8px side padding
        section.gap(16.0);
        let name_top = section.height;
        let lines = wrap_text(
            &document.issuer_name,
            column_width - 16.0,
            text.font_size,
            self.fonts.bold.as_ref(),
        );
        let widest = lines
            .iter()
            .map(|l| self.fonts.bold.text_width(l, text.font_size))
            .fold(0.0_f32, f32::max);
        self.lines(
            &mut section,
            &document.issuer_name,
            x + 8.0,
            column_width - 16.0,
            text,
            FaceStyle::Bold,
            Alignment::Center,
            false,
        );
        section.gap(4.0);
        let rule_width = widest + 16.0;
        section.elements.push(Element::Fill {
            rect: Rect::new(
                x + (column_width - rule_width) / 2.0,
                section.height,
                rule_width,
                1.0,
            ),
            color: text.color,
        });
        section.gap(1.0);
        trace!(
            "Issuer name block at {:.1}..{:.1}",
            name_top, section.height
        );
        section
    }

    /// Stamp under the signature, or the dashed placeholder
    fn signature_area(&self, elements: &mut Vec<Element>, area: Rect, assets: &AssetSet) {
        if let Some(stamp) = &assets.stamp {
            let size = self.style.stamp_size;
            let center = area.center();
            let stamp_box = Rect::new(center.x - size / 2.0, center.y - size / 2.0, size, size);
            elements.push(Element::Image(ImageElement {
                rect: stamp_box.fit_contain(stamp.width() as f32, stamp.height() as f32),
                asset: stamp.clone(),
                rotation_deg: STAMP_ROTATION_DEG,
                opacity: STAMP_OPACITY,
                blend: Blend::Multiply,
            }));
        }

        match &assets.signature {
            Some(signature) => elements.push(Element::Image(ImageElement {
                rect: area.fit_contain(signature.width() as f32, signature.height() as f32),
                asset: signature.clone(),
                rotation_deg: 0.0,
                opacity: 1.0,
                blend: Blend::Multiply,
            })),
            None => {
                elements.push(Element::Placeholder(PlaceholderElement {
                    rect: area,
                    outline: Outline::Rounded(4.0),
                    stroke: self.style.placeholder_stroke,
                    stroke_width: 1.0,
                    fill: None,
                }));
                let label = &self.style.placeholder;
                let mut run = self.run(
                    SIGNATURE_PLACEHOLDER,
                    area,
                    area.y + (area.height - label.line_height) / 2.0,
                    label,
                    FaceStyle::Regular,
                    Alignment::Center,
                );
                run.italic = true;
                elements.push(Element::Text(run));
            }
        }
    }

    /// Label / colon / value rows
    fn identity_table(&self, section: &mut Section, rows: &[(&str, Span)], width: f32) {
        let style = &self.style;
        let body = &style.body;
        let value_x = style.label_column_width + style.colon_column_width;
        let value_width = (width - value_x).max(0.0);

        for (label, value) in rows {
            let top = section.height + style.table_row_padding;
            let label_box = Rect::new(0.0, top, style.label_column_width, body.line_height);
            section.elements.push(Element::Text(self.run(
                label,
                label_box,
                top,
                body,
                FaceStyle::Regular,
                Alignment::Left,
            )));
            let colon_box = Rect::new(
                style.label_column_width,
                top,
                style.colon_column_width,
                body.line_height,
            );
            section.elements.push(Element::Text(self.run(
                ":",
                colon_box,
                top,
                body,
                FaceStyle::Regular,
                Alignment::Left,
            )));

            let lines = wrap_spans(
                std::slice::from_ref(value),
                value_width,
                body.font_size,
                &self.fonts,
            );
            self.push_rich_lines(
                &mut section.elements,
                &lines,
                value_x,
                top,
                value_width,
                body,
                false,
            );
            section.height = top + lines.len() as f32 * body.line_height + style.table_row_padding;
        }
    }

    fn paragraph(&self, section: &mut Section, spans: &[Span], width: f32) {
        let body = &self.style.body;
        let lines = wrap_spans(spans, width, body.font_size, &self.fonts);
        self.push_rich_lines(
            &mut section.elements,
            &lines,
            0.0,
            section.height,
            width,
            body,
            true,
        );
        section.height += lines.len() as f32 * body.line_height;
    }

    /// Append wrapped rich lines starting at `top`.
    ///
    /// Fragments of one line share the lowest baseline among their faces.
    /// With `justify` every line but the last is stretched to `width`.
    #[allow(clippy::too_many_arguments)]
    fn push_rich_lines(
        &self,
        elements: &mut Vec<Element>,
        lines: &[WrappedLine],
        x: f32,
        top: f32,
        width: f32,
        style: &TextStyle,
        justify: bool,
    ) {
        for (i, line) in lines.iter().enumerate() {
            let line_top = top + i as f32 * style.line_height;
            let baseline = line
                .fragments
                .iter()
                .map(|f| self.baseline(line_top, style, f.face))
                .fold(line_top, f32::max);

            let mut line = line.clone();
            let word_spacing = if justify && i + 1 < lines.len() {
                line.justify(width)
            } else {
                0.0
            };
            for fragment in line.fragments {
                elements.push(Element::Text(TextRun {
                    origin: Point::new(x + fragment.x, baseline),
                    text: fragment.text,
                    font_size: style.font_size,
                    face: fragment.face,
                    italic: false,
                    color: style.color,
                    underline: false,
                    width: fragment.width,
                    word_spacing,
                }));
            }
        }
    }

    /// Wrap plain text into `width` and append one run per line
    #[allow(clippy::too_many_arguments)]
    fn lines(
        &self,
        section: &mut Section,
        text: &str,
        x: f32,
        width: f32,
        style: &TextStyle,
        face: FaceStyle,
        alignment: Alignment,
        underline: bool,
    ) {
        for line in wrap_text(text, width, style.font_size, self.fonts.face(face)) {
            let line_box = Rect::new(x, section.height, width, style.line_height);
            let mut run = self.run(&line, line_box, section.height, style, face, alignment);
            run.underline = underline;
            section.elements.push(Element::Text(run));
            section.height += style.line_height;
        }
    }

    /// A single run aligned inside `line_box`, with its line box starting at `top`
    fn run(
        &self,
        text: &str,
        line_box: Rect,
        top: f32,
        style: &TextStyle,
        face: FaceStyle,
        alignment: Alignment,
    ) -> TextRun {
        let width = self.fonts.face(face).text_width(text, style.font_size);
        let x = match alignment {
            Alignment::Left => line_box.x,
            Alignment::Center => line_box.x + (line_box.width - width) / 2.0,
            Alignment::Right => line_box.right() - width,
        };
        TextRun {
            origin: Point::new(x, self.baseline(top, style, face)),
            text: text.to_string(),
            font_size: style.font_size,
            face,
            italic: false,
            color: style.color,
            underline: false,
            width,
            word_spacing: 0.0,
        }
    }

    /// Baseline of a line box starting at `top` (half-leading above the glyphs)
    fn baseline(&self, top: f32, style: &TextStyle, face: FaceStyle) -> f32 {
        let half_leading = (style.line_height - style.font_size) / 2.0;
        top + half_leading + self.fonts.face(face).ascent(style.font_size)
    }
}

impl Default for DocumentComposer {
    fn default() -> Self {
        Self::new(PageMetrics::A4)
    }
}

fn block(kind: BlockKind, frame: Rect, section: Section) -> Block {
    Block {
        kind,
        frame,
        content_height: section.height,
        clip: true,
        elements: section.elements,
    }
}

fn offset_element(element: Element, dx: f32, dy: f32) -> Element {
    match element {
        Element::Fill { rect, color } => Element::Fill {
            rect: rect.translate(dx, dy),
            color,
        },
        Element::Text(mut run) => {
            run.origin = Point::new(run.origin.x + dx, run.origin.y + dy);
            Element::Text(run)
        }
        Element::Image(mut image) => {
            image.rect = image.rect.translate(dx, dy);
            Element::Image(image)
        }
        Element::Placeholder(mut placeholder) => {
            placeholder.rect = placeholder.rect.translate(dx, dy);
            Element::Placeholder(placeholder)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ASCENT_RATIO;
    use crate::document::AssetKind;
    use crate::font::{EstimatedFace, FontFace};
    use image::RgbaImage;
    use std::sync::Arc;

    /// Face with a taller ascent than the estimated one
    #[derive(Debug)]
    struct TallFace;

    impl FontFace for TallFace {
        fn char_width(&self, _ch: char, font_size: f32) -> f32 {
            font_size * 0.5
        }

        fn ascent(&self, font_size: f32) -> f32 {
            font_size * 0.95
        }
    }

    fn runs(block: &Block) -> Vec<&TextRun> {
        block
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text(run) => Some(run),
                _ => None,
            })
            .collect()
    }

    fn sample_document() -> Document {
        Document {
            letter_date: "2026-10-18".to_string(),
            ..Document::default()
        }
    }

    fn texts(block: &Block) -> Vec<&str> {
        block
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blocks_fill_fixed_page() {
        let composer = DocumentComposer::default();
        let page = composer.compose(&sample_document(), &AssetSet::new()).unwrap();

        assert_eq!(page.blocks.len(), 4);
        assert_eq!(page.size, PageMetrics::A4.size_px());
        assert!(page.fits_page());

        let footer = page.block(BlockKind::Footer).unwrap();
        assert!((footer.frame.bottom() - page.content_box.bottom()).abs() < 1e-3);

        let body = page.block(BlockKind::Body).unwrap();
        assert!(body.clip);
        assert!(!body.overflows());
        assert!((body.frame.bottom() - footer.frame.y).abs() < 1e-3);
    }

    #[test]
    fn test_long_body_is_clipped_and_footer_stays_on_page() {
        let mut document = sample_document();
        document.purpose = "keperluan administrasi ".repeat(200);
        let page = DocumentComposer::default()
            .compose(&document, &AssetSet::new())
            .unwrap();

        let body = page.block(BlockKind::Body).unwrap();
        assert!(body.overflows());
        assert!(body.content_height > body.frame.height);

        let footer = page.block(BlockKind::Footer).unwrap();
        assert!(page.content_box.contains_rect(&footer.frame));
        assert!(texts(footer).contains(&"Thomas Alvian"));
    }

    #[test]
    fn test_oversized_header_is_cut_above_footer() {
        let mut document = sample_document();
        document.company_address = "Jl. Gatot Subroto No.34\n".repeat(60);
        let page = DocumentComposer::default()
            .compose(&document, &AssetSet::new())
            .unwrap();

        assert!(page.fits_page());
        let header = page.block(BlockKind::Header).unwrap();
        let footer = page.block(BlockKind::Footer).unwrap();
        assert!(header.clip);
        assert!(header.overflows());
        assert!(header.frame.bottom() <= footer.frame.y + 1e-3);
        assert!(page.content_box.contains_rect(&footer.frame));
        assert!((footer.frame.height - footer.content_height).abs() < 1e-3);
        assert!(texts(footer).contains(&"Thomas Alvian"));
    }

    #[test]
    fn test_letter_text_content() {
        let page = DocumentComposer::default()
            .compose(&sample_document(), &AssetSet::new())
            .unwrap();

        let header = page.block(BlockKind::Header).unwrap();
        assert!(texts(header).contains(&"PT. GARUDA WINGS"));

        let title = page.block(BlockKind::Title).unwrap();
        assert_eq!(texts(title), vec![LETTER_TITLE, "No. 101/SPK-RM/VI/2024"]);

        let footer = page.block(BlockKind::Footer).unwrap();
        assert!(texts(footer).contains(&"Medan, 18 Oktober 2026"));
    }

    #[test]
    fn test_empty_signature_shows_placeholder() {
        let page = DocumentComposer::default()
            .compose(&sample_document(), &AssetSet::new())
            .unwrap();
        let footer = page.block(BlockKind::Footer).unwrap();

        assert!(
            !footer
                .elements
                .iter()
                .any(|e| matches!(e, Element::Image(_)))
        );
        assert!(
            footer
                .elements
                .iter()
                .any(|e| matches!(e, Element::Placeholder(_)))
        );
        assert!(texts(footer).contains(&SIGNATURE_PLACEHOLDER));
    }

    #[test]
    fn test_stamp_drawn_before_signature() {
        let assets = AssetSet::new()
            .with(AssetKind::Stamp, ImageAsset::new(RgbaImage::new(50, 50)))
            .with(AssetKind::Signature, ImageAsset::new(RgbaImage::new(300, 100)));
        let page = DocumentComposer::default()
            .compose(&sample_document(), &assets)
            .unwrap();
        let footer = page.block(BlockKind::Footer).unwrap();

        let images: Vec<&ImageElement> = footer
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Image(image) => Some(image),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 2);

        let (stamp, signature) = (images[0], images[1]);
        assert_eq!(stamp.rotation_deg, STAMP_ROTATION_DEG);
        assert_eq!(stamp.blend, Blend::Multiply);
        assert!(stamp.opacity < 1.0);
        assert_eq!(signature.blend, Blend::Multiply);
        assert_eq!(signature.rotation_deg, 0.0);
        // Signature keeps its 3:1 aspect inside the 256x96 area
        assert!((signature.rect.width / signature.rect.height - 3.0).abs() < 1e-3);
        assert!(
            !footer
                .elements
                .iter()
                .any(|e| matches!(e, Element::Placeholder(_)))
        );
    }

    #[test]
    fn test_logo_replaces_placeholder() {
        let assets =
            AssetSet::new().with(AssetKind::CompanyLogo, ImageAsset::new(RgbaImage::new(200, 100)));
        let page = DocumentComposer::default()
            .compose(&sample_document(), &assets)
            .unwrap();
        let header = page.block(BlockKind::Header).unwrap();

        let logo = header
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Image(image) => Some(image),
                _ => None,
            })
            .expect("logo drawn");
        assert_eq!(logo.rect.width, 100.0);
        assert_eq!(logo.rect.height, 50.0);
        assert!(!texts(header).contains(&LOGO_PLACEHOLDER));
    }

    #[test]
    fn test_body_paragraphs_are_justified() {
        let page = DocumentComposer::default()
            .compose(&sample_document(), &AssetSet::new())
            .unwrap();
        let body = page.block(BlockKind::Body).unwrap();
        let width = body.frame.width;
        let body_runs = runs(body);

        assert!(body_runs.iter().all(|r| r.origin.x + r.width <= width + 1e-2));

        let justified: Vec<&&TextRun> = body_runs
            .iter()
            .filter(|r| r.word_spacing > 0.0)
            .collect();
        assert!(!justified.is_empty());
        for run in justified {
            let line_end = body_runs
                .iter()
                .filter(|r| r.origin.y == run.origin.y)
                .map(|r| r.origin.x + r.width)
                .fold(0.0_f32, f32::max);
            assert!((line_end - width).abs() < 1e-2);
        }

        // The closing sentence ends its paragraph and stays ragged
        let closing = body_runs
            .iter()
            .find(|r| r.text.ends_with("mestinya."))
            .unwrap();
        assert_eq!(closing.word_spacing, 0.0);
    }

    #[test]
    fn test_baseline_follows_face_ascent() {
        let fonts = FontSet::new(Arc::new(EstimatedFace::default()), Arc::new(TallFace));
        let composer = DocumentComposer::default().with_fonts(fonts);
        let page = composer
            .compose(&sample_document(), &AssetSet::new())
            .unwrap();
        let style = &composer.style;

        let title = runs(page.block(BlockKind::Title).unwrap());
        assert_eq!(title[0].text, LETTER_TITLE);
        let heading = &style.title;
        let expected =
            (heading.line_height - heading.font_size) / 2.0 + heading.font_size * 0.95;
        assert!((title[0].origin.y - expected).abs() < 1e-3);

        let number = &style.title_number;
        let number_top = heading.line_height + 4.0;
        let expected = number_top
            + (number.line_height - number.font_size) / 2.0
            + number.font_size * DEFAULT_ASCENT_RATIO;
        assert!((title[1].origin.y - expected).abs() < 1e-3);

        // Regular and bold fragments of one line share a baseline
        let body = runs(page.block(BlockKind::Body).unwrap());
        let lead = body
            .iter()
            .find(|r| r.text.starts_with("Benar-benar"))
            .unwrap();
        let company = body
            .iter()
            .find(|r| r.face == FaceStyle::Bold && r.text == "PT. Garuda Wings")
            .unwrap();
        assert_eq!(lead.origin.y, company.origin.y);
    }
}
