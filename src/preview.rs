//! The live, on-screen page
//!
//! A [`Preview`] composes the letter once at native size and presents it
//! through the [`LayoutScaler`]'s transform. Resizing the container only
//! changes the transform; editing the document or swapping an asset
//! recomposes.

use crate::Result;
use crate::compose::DocumentComposer;
use crate::document::{AssetKind, AssetSet, Document, ImageAsset};
use crate::layout::{PageLayout, Size};
use crate::scale::{DisplayTransform, LayoutScale, LayoutScaler};
use crate::style::Color;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Shared handle to the live preview
pub type PreviewHandle = Arc<RwLock<Preview>>;

/// Drop shadow around the on-screen page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur: f32,
    pub offset_y: f32,
    pub color: Color,
}

/// Screen-only decoration of a page: transform, chrome and spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationStyle {
    pub transform: DisplayTransform,
    pub shadow: Option<Shadow>,
    /// Border width and color
    pub border: Option<(f32, Color)>,
    pub margin: f32,
}

impl PresentationStyle {
    /// Decoration of the live preview at the given scale
    pub fn live(scale: LayoutScale) -> Self {
        Self {
            transform: DisplayTransform::from_scale(scale),
            shadow: Some(Shadow {
                blur: 50.0,
                offset_y: 25.0,
                color: Color::gray(0.2),
            }),
            border: None,
            margin: 0.0,
        }
    }

    /// No transform, no chrome
    pub fn native() -> Self {
        Self {
            transform: DisplayTransform::IDENTITY,
            shadow: None,
            border: None,
            margin: 0.0,
        }
    }

    pub fn is_native(&self) -> bool {
        *self == Self::native()
    }
}

/// What the screen shows: the shared native layout plus its presentation
#[derive(Debug, Clone)]
pub struct DisplayTree {
    pub page: Arc<PageLayout>,
    pub presentation: PresentationStyle,
    /// Space the scaled page occupies in the container
    pub outer_size: Size,
}

/// Live page bound to the entry form's data
#[derive(Debug)]
pub struct Preview {
    composer: DocumentComposer,
    document: Document,
    assets: AssetSet,
    scaler: LayoutScaler,
    page: Option<Arc<PageLayout>>,
}

impl Preview {
    /// An unmounted preview; nothing is laid out until [`Preview::mount`]
    pub fn new(composer: DocumentComposer, document: Document, assets: AssetSet) -> Self {
        let scaler = LayoutScaler::new(composer.metrics);
        Self {
            composer,
            document,
            assets,
            scaler,
            page: None,
        }
    }

    pub fn with_scaler(mut self, scaler: LayoutScaler) -> Self {
        self.scaler = scaler;
        self
    }

    /// Wrap into a shareable handle
    pub fn into_handle(self) -> PreviewHandle {
        Arc::new(RwLock::new(self))
    }

    /// Attach to a container: compose at native size and fit the width
    #[instrument(skip(self))]
    pub fn mount(&mut self, container_width: f32) -> Result<()> {
        self.scaler.on_container_resize(container_width)?;
        self.compose()?;
        debug!("Preview mounted at scale {:.4}", self.scaler.current().value());
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.page = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.page.is_some()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    pub fn scale(&self) -> LayoutScale {
        self.scaler.current()
    }

    /// Replace the letter data and recompose
    pub fn set_document(&mut self, document: Document) -> Result<()> {
        self.document = document;
        self.recompose()
    }

    /// Swap one image (or clear it) and recompose
    pub fn replace_asset(&mut self, kind: AssetKind, asset: Option<ImageAsset>) -> Result<()> {
        self.assets.replace(kind, asset);
        self.recompose()
    }

    /// React to the hosting container changing width.
    ///
    /// Only the presentation transform changes; the composed page is kept.
    pub fn on_container_resize(&mut self, container_width: f32) -> Result<LayoutScale> {
        self.scaler.on_container_resize(container_width)
    }

    /// The live view, or `None` while unmounted
    pub fn render_for_display(&self) -> Option<DisplayTree> {
        let page = self.page.clone()?;
        Some(DisplayTree {
            page,
            presentation: PresentationStyle::live(self.scaler.current()),
            outer_size: self.scaler.display_size(),
        })
    }

    /// The native-size page, or `None` while unmounted
    pub fn render_for_export(&self) -> Option<Arc<PageLayout>> {
        self.page.clone()
    }

    /// Edits made while unmounted are only stored
    fn recompose(&mut self) -> Result<()> {
        if !self.is_mounted() {
            return Ok(());
        }
        self.compose()
    }

    fn compose(&mut self) -> Result<()> {
        let page = self.composer.compose(&self.document, &self.assets)?;
        self.page = Some(Arc::new(page));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BlockKind;
    use image::RgbaImage;

    fn preview() -> Preview {
        Preview::new(
            DocumentComposer::default(),
            Document::default(),
            AssetSet::default(),
        )
    }

    #[test]
    fn test_unmounted_preview_renders_nothing() {
        let preview = preview();
        assert!(!preview.is_mounted());
        assert!(preview.render_for_display().is_none());
        assert!(preview.render_for_export().is_none());
    }

    #[test]
    fn test_mount_composes_and_scales() {
        let mut preview = preview();
        preview.mount(440.0).unwrap();
        let tree = preview.render_for_display().unwrap();
        assert!((tree.presentation.transform.scale - 400.0 / 793.7).abs() < 1e-3);
        assert!(tree.presentation.shadow.is_some());
        assert!((tree.outer_size.width - 400.0).abs() < 0.1);
        assert!((tree.page.size.width - 793.7).abs() < 0.1);
    }

    #[test]
    fn test_resize_keeps_layout() {
        let mut preview = preview();
        preview.mount(440.0).unwrap();
        let before = preview.render_for_export().unwrap();
        preview.on_container_resize(1200.0).unwrap();
        let after = preview.render_for_export().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(preview.scale().is_native());
    }

    #[test]
    fn test_edit_recomposes() {
        let mut preview = preview();
        preview.mount(1000.0).unwrap();
        let before = preview.render_for_export().unwrap();

        let mut document = preview.document().clone();
        document.recipient_name = "Rina Kartika".to_string();
        preview.set_document(document).unwrap();
        let after = preview.render_for_export().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(preview.document().recipient_name, "Rina Kartika");
    }

    #[test]
    fn test_replace_asset_updates_footer() {
        let mut preview = preview();
        preview.mount(1000.0).unwrap();
        let stamp = ImageAsset::new(RgbaImage::new(10, 10));
        preview.replace_asset(AssetKind::Stamp, Some(stamp)).unwrap();

        let page = preview.render_for_export().unwrap();
        let footer = page.block(BlockKind::Footer).unwrap();
        assert!(footer.elements.iter().any(|e| matches!(e, crate::layout::Element::Image(_))));
    }

    #[test]
    fn test_edits_while_unmounted_apply_on_mount() {
        let mut preview = preview();
        let mut document = Document::default();
        document.company_name = "PT. Nusantara".to_string();
        preview.set_document(document).unwrap();
        assert!(!preview.is_mounted());

        preview.mount(1000.0).unwrap();
        assert!(preview.is_mounted());
        preview.unmount();
        assert!(preview.render_for_export().is_none());
    }
}
