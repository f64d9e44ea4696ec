//! Constants for page geometry, text estimation and export timing

use std::time::Duration;

/// Millimetres per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Reference density for pixel-equivalent units (CSS pixels per inch)
pub const REFERENCE_DPI: f32 = 96.0;

/// PDF points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// A4 page width in millimetres
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 page height in millimetres
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Left, right and top page margin in millimetres
pub const PAGE_MARGIN_MM: f32 = 25.0;

/// Bottom page margin in millimetres
pub const PAGE_MARGIN_BOTTOM_MM: f32 = 20.0;

/// Fixed oversampling factor applied when capturing the page
pub const DEFAULT_OVERSAMPLING: f32 = 2.0;

/// Horizontal padding of the preview container, subtracted from its width
pub const DEFAULT_PREVIEW_GUTTER: f32 = 40.0;

/// Default character width ratio for text estimation
/// (average character width as a fraction of font size)
pub const DEFAULT_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Average character width ratio of a serif text face
pub const SERIF_CHAR_WIDTH_RATIO: f32 = 0.45;

/// Average character width ratio of a bold serif face
pub const SERIF_BOLD_CHAR_WIDTH_RATIO: f32 = 0.48;

/// Ascent as a fraction of font size when a face does not report one
pub const DEFAULT_ASCENT_RATIO: f32 = 0.8;

/// Height of a greeked glyph block as a fraction of font size
pub const GREEK_HEIGHT_RATIO: f32 = 0.5;

/// Rotation applied to the stamp image, in degrees
pub const STAMP_ROTATION_DEG: f32 = -12.0;

/// Combined opacity of the stamp (image opacity times overlay opacity)
pub const STAMP_OPACITY: f32 = 0.8 * 0.9;

/// Delay before capture so pending UI transitions settle
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// How long the success indicator stays up before returning to idle
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_millis(3000);

/// How long a success notice stays visible
pub const DEFAULT_NOTICE_DISPLAY: Duration = Duration::from_millis(4000);

/// Prefix of exported file names
pub const DEFAULT_FILE_PREFIX: &str = "Surat_Kerja_";

/// Extension of exported files
pub const PDF_EXTENSION: &str = "pdf";

/// Notice shown when an export is requested before the preview is mounted
pub const MESSAGE_NOT_READY: &str = "Preview belum siap untuk di-download.";

/// Notice shown when capture or assembly fails
pub const MESSAGE_FAILED: &str = "Gagal memproses PDF. Silakan coba lagi.";

/// Notice shown after a successful delivery
pub const MESSAGE_DELIVERED: &str = "Dokumen PDF berhasil didownload.";
