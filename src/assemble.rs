//! Embeds a captured page into a single-page PDF

use crate::Result;
use crate::drawing;
use crate::error::ExportError;
use crate::layout::{Rect, Size};
use crate::metrics::PageMetrics;
use crate::raster::Bitmap;
use crate::style::Color;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument, trace};

/// Resource name of the page image
const PAGE_IMAGE_NAME: &str = "Im1";

/// How the bitmap is placed on the output page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitPolicy {
    /// Fill the whole page exactly, regardless of the bitmap's aspect
    #[default]
    Stretch,
    /// Full page width at the top edge, height from the bitmap's aspect.
    /// A bitmap taller than the page runs past the bottom edge and is cut.
    TopAligned,
}

impl FitPolicy {
    /// Placement of a `width` x `height` bitmap on a page of `page` points,
    /// in PDF user space (bottom-left origin)
    pub fn placement(&self, width: u32, height: u32, page: Size) -> Rect {
        match self {
            FitPolicy::Stretch => Rect::new(0.0, 0.0, page.width, page.height),
            FitPolicy::TopAligned => {
                let image_height = page.width * height as f32 / width as f32;
                Rect::new(0.0, page.height - image_height, page.width, image_height)
            }
        }
    }
}

/// The finished output file
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    /// Page size in points
    pub page_size: Size,
    /// Where the image landed, in points
    pub placement: Rect,
    pub page_count: usize,
}

/// Extension trait for lopdf::Document to place a captured page image
pub trait PageImageEmbedding {
    /// Embed `bitmap` as an image XObject and draw it into `placement`
    ///
    /// # Arguments
    /// * `page_id` - The object ID of the page to draw on
    /// * `bitmap` - The captured page
    /// * `placement` - Target rectangle in PDF user space
    fn embed_page_image(
        &mut self,
        page_id: ObjectId,
        bitmap: &Bitmap,
        placement: Rect,
    ) -> Result<()>;
}

impl PageImageEmbedding for Document {
    #[instrument(skip(self, bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
    fn embed_page_image(
        &mut self,
        page_id: ObjectId,
        bitmap: &Bitmap,
        placement: Rect,
    ) -> Result<()> {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => bitmap.width() as i64,
                "Height" => bitmap.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            bitmap.to_rgb_bytes(),
        );
        let image_id = self.add_object(image);
        drawing::register_xobject(self, page_id, PAGE_IMAGE_NAME, image_id)?;

        // Opaque white from the page bottom up to the image's top edge
        let mut operations = drawing::draw_rectangle_fill(
            Rect::new(0.0, 0.0, placement.width, placement.bottom().max(0.0)),
            Color::white(),
        );
        operations.extend(drawing::draw_image(PAGE_IMAGE_NAME, placement));
        drawing::add_operations_to_page(self, page_id, operations)?;

        trace!("Placed page image at {:?}", placement);
        Ok(())
    }
}

/// Builds the output PDF around a captured bitmap
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler {
    metrics: PageMetrics,
    fit: FitPolicy,
}

impl DocumentAssembler {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            fit: FitPolicy::default(),
        }
    }

    pub fn with_fit(mut self, fit: FitPolicy) -> Self {
        self.fit = fit;
        self
    }

    pub fn fit(&self) -> FitPolicy {
        self.fit
    }

    /// Build a single-page PDF holding `bitmap`.
    ///
    /// Output is byte-for-byte identical for identical bitmaps.
    #[instrument(skip_all, fields(fit = ?self.fit))]
    pub fn assemble(&self, bitmap: &Bitmap) -> Result<AssembledDocument> {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(ExportError::AssemblyError(format!(
                "Cannot embed an empty {}x{} bitmap",
                bitmap.width(),
                bitmap.height()
            )));
        }
        let page_size = self.metrics.size_pt();
        let placement = self.fit.placement(bitmap.width(), bitmap.height(), page_size);

        let mut doc = Document::with_version("1.5");
        let media_box = vec![
            0.into(),
            0.into(),
            page_size.width.into(),
            page_size.height.into(),
        ];

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
            "MediaBox" => media_box.clone(),
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
        });

        // Add page to pages
        if let Ok(Object::Dictionary(pages)) = doc.get_object_mut(pages_id) {
            if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
                kids.push(page_id.into());
            }
            pages.set("Count", Object::Integer(1));
        }

        let resources_id = doc.add_object(dictionary! {});
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set("Resources", resources_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.embed_page_image(page_id, bitmap, placement)?;
        doc.compress();

        let page_count = doc.get_pages().len();
        if page_count != 1 {
            return Err(ExportError::AssemblyError(format!(
                "Expected a single page, built {}",
                page_count
            )));
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        debug!(
            "Assembled {} byte PDF, page {:.2}x{:.2}pt",
            bytes.len(),
            page_size.width,
            page_size.height
        );

        Ok(AssembledDocument {
            bytes,
            page_size,
            placement,
            page_count,
        })
    }
}
