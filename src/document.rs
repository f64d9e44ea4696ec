//! Letter data and image assets handed to the composer

use crate::constants::PDF_EXTENSION;
use chrono::{Datelike, NaiveDate};
use image::RgbaImage;
use std::sync::Arc;

/// Textual fields of the employment-verification letter.
///
/// Every field is always populated; [`Document::default`] supplies the
/// values the entry form starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub issuer_name: String,
    pub issuer_job: String,
    pub issuer_address: String,
    pub recipient_name: String,
    pub recipient_job: String,
    pub recipient_address: String,
    pub letter_number: String,
    /// ISO date, `YYYY-MM-DD`
    pub letter_date: String,
    pub purpose: String,
    pub company_name: String,
    pub company_address: String,
    pub company_contact: String,
    pub letter_place: String,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            issuer_name: "Thomas Alvian".to_string(),
            issuer_job: "Direktur Utama PT. Garuda Wings".to_string(),
            issuer_address: "Jl. Gatot Subroto No.34 Medan Kota".to_string(),
            recipient_name: "Astuti Rahma Ningrum, S.E.".to_string(),
            recipient_job: "Manajer Produksi".to_string(),
            recipient_address: "Jl. Setia Budi No.102 Medan Kota".to_string(),
            letter_number: "101/SPK-RM/VI/2024".to_string(),
            letter_date: chrono::Local::now()
                .date_naive()
                .format("%Y-%m-%d")
                .to_string(),
            purpose: "administrasi pengajuan KPR".to_string(),
            company_name: "PT. Garuda Wings".to_string(),
            company_address: "Jl. Gatot Subroto No.34 Medan Kota".to_string(),
            company_contact: "Telp. 061-123456, Email: info@garudawings.com".to_string(),
            letter_place: "Medan".to_string(),
        }
    }
}

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format an ISO date in the Indonesian long form, e.g. `18 Oktober 2026`.
///
/// Text that is not an ISO date is returned unchanged.
pub fn format_letter_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => format!("{} {} {}", d.day(), MONTHS_ID[d.month0() as usize], d.year()),
        Err(_) => date.to_string(),
    }
}

/// Replace each run of whitespace (and any path separator) with `separator`
pub fn normalize_file_stem(name: &str, separator: char) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(separator);
            }
            in_whitespace = true;
        } else {
            out.push(if ch == '/' || ch == '\\' { separator } else { ch });
            in_whitespace = false;
        }
    }
    out
}

impl Document {
    /// Letter date as printed in the signature block
    pub fn formatted_date(&self) -> String {
        format_letter_date(&self.letter_date)
    }

    /// File name of the exported document: prefix, normalized recipient
    /// name, `.pdf`
    pub fn export_file_name(&self, prefix: &str) -> String {
        format!(
            "{}{}.{}",
            prefix,
            normalize_file_stem(&self.recipient_name, '_'),
            PDF_EXTENSION
        )
    }
}

/// Where an image asset was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetOrigin {
    #[default]
    Local,
    /// Fetched from another origin
    Remote,
}

/// Decoded raster image shared between the form and the page
#[derive(Clone)]
pub struct ImageAsset {
    pub pixels: Arc<RgbaImage>,
    pub origin: AssetOrigin,
}

impl ImageAsset {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            origin: AssetOrigin::Local,
        }
    }

    /// Decode PNG or JPEG data
    pub fn decode(data: &[u8]) -> crate::Result<Self> {
        let image = image::load_from_memory(data)?;
        Ok(Self::new(image.to_rgba8()))
    }

    pub fn with_origin(mut self, origin: AssetOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("origin", &self.origin)
            .finish()
    }
}

/// The three optional images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    CompanyLogo,
    Signature,
    Stamp,
}

/// Optional logo, signature and stamp images
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    pub company_logo: Option<ImageAsset>,
    pub signature: Option<ImageAsset>,
    pub stamp: Option<ImageAsset>,
}

impl AssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: AssetKind, asset: ImageAsset) -> Self {
        self.replace(kind, Some(asset));
        self
    }

    pub fn get(&self, kind: AssetKind) -> Option<&ImageAsset> {
        match kind {
            AssetKind::CompanyLogo => self.company_logo.as_ref(),
            AssetKind::Signature => self.signature.as_ref(),
            AssetKind::Stamp => self.stamp.as_ref(),
        }
    }

    /// Swap in a new image (or clear it), returning the previous one
    pub fn replace(&mut self, kind: AssetKind, asset: Option<ImageAsset>) -> Option<ImageAsset> {
        let slot = match kind {
            AssetKind::CompanyLogo => &mut self.company_logo,
            AssetKind::Signature => &mut self.signature,
            AssetKind::Stamp => &mut self.stamp,
        };
        std::mem::replace(slot, asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_letter_date() {
        assert_eq!(format_letter_date("2026-10-18"), "18 Oktober 2026");
        assert_eq!(format_letter_date("2024-06-01"), "1 Juni 2024");
        assert_eq!(format_letter_date("kemarin"), "kemarin");
    }

    #[test]
    fn test_export_file_name() {
        let mut doc = Document::default();
        doc.recipient_name = "Astuti Rahma Ningrum".to_string();
        assert_eq!(
            doc.export_file_name("Surat_Kerja_"),
            "Surat_Kerja_Astuti_Rahma_Ningrum.pdf"
        );

        doc.recipient_name = "Budi \t  Santoso/HRD".to_string();
        assert_eq!(doc.export_file_name(""), "Budi_Santoso_HRD.pdf");
    }

    #[test]
    fn test_default_document_is_populated() {
        let doc = Document::default();
        assert!(!doc.recipient_name.is_empty());
        assert!(NaiveDate::parse_from_str(&doc.letter_date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_decode_asset() {
        let mut png = Vec::new();
        RgbaImage::new(3, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let asset = ImageAsset::decode(&png).unwrap();
        assert_eq!((asset.width(), asset.height()), (3, 2));
        assert_eq!(asset.origin, AssetOrigin::Local);

        assert!(matches!(
            ImageAsset::decode(b"not an image"),
            Err(crate::error::ExportError::ImageError(_))
        ));
    }

    #[test]
    fn test_asset_replace_discards_old() {
        let mut assets = AssetSet::new();
        assert!(assets.get(AssetKind::Stamp).is_none());

        let first = ImageAsset::new(RgbaImage::new(4, 4));
        assert!(assets.replace(AssetKind::Stamp, Some(first)).is_none());

        let previous = assets.replace(AssetKind::Stamp, None);
        assert_eq!(previous.map(|a| a.width()), Some(4));
        assert!(assets.get(AssetKind::Stamp).is_none());
    }
}
