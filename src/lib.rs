//! Fixed-geometry letter layout and single-page PDF export built on lopdf
//!
//! An employment-verification letter is composed once at its native A4 size.
//! The on-screen [`Preview`] only scales that layout to fit its container;
//! the [`Exporter`] captures a detached native-size copy at a fixed
//! oversampling factor and embeds the bitmap into a one-page PDF, so the
//! display scale never reaches the exported file.
//!
//! ```no_run
//! use letter_export::{
//!     AssetSet, Document, DocumentComposer, Exporter, Preview, SaveToDirectory,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> letter_export::Result<()> {
//! let preview = Preview::new(DocumentComposer::default(), Document::default(), AssetSet::new())
//!     .into_handle();
//! preview.write().mount(1024.0)?;
//!
//! let exporter = Exporter::new(Arc::new(SaveToDirectory::new(".")));
//! let outcome = exporter.export(&preview).await?;
//! println!("saved {}", outcome.receipt.file_name);
//! # Ok(())
//! # }
//! ```

mod drawing;
mod paint;

pub mod assemble;
pub mod compose;
pub mod constants;
pub mod delivery;
pub mod document;
pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod metrics;
pub mod preview;
pub mod raster;
pub mod scale;
pub mod snapshot;
pub mod style;
pub mod text;

pub use assemble::{AssembledDocument, DocumentAssembler, FitPolicy, PageImageEmbedding};
pub use compose::DocumentComposer;
pub use delivery::{Delivery, DeliveryReceipt, MemoryDelivery, SaveToDirectory};
pub use document::{AssetKind, AssetOrigin, AssetSet, Document, ImageAsset};
pub use error::{ExportError, Result};
pub use export::{
    ExportOptions, ExportOutcome, ExportState, Exporter, Indicator, JobId, JobSlot, Notice,
    NoticeBoard, NoticeKind,
};
pub use font::{EstimatedFace, FontFace, FontSet};
pub use layout::PageLayout;
pub use metrics::{Margins, PageMetrics};
pub use preview::{DisplayTree, PresentationStyle, Preview, PreviewHandle};
pub use raster::{Bitmap, Rasterizer};
pub use scale::{DisplayTransform, LayoutScale, LayoutScaler};
pub use snapshot::{IsolatedSnapshot, OffscreenHost, Snapshot, SnapshotIsolator};
pub use style::{Color, LetterStyle, TextStyle};

#[cfg(feature = "ttf-parser")]
pub use font::TtfFace;
