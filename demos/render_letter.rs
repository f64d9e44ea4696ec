//! Render the default letter and save it as a PDF
//!
//! Usage: render_letter [OUTPUT_DIR] [SIGNATURE_IMAGE] [STAMP_IMAGE]
//!
//! Text uses the TrueType pair named by `LETTER_FONT` and `LETTER_FONT_BOLD`,
//! or the first serif pair found in the usual system locations.

use letter_export::{
    AssetKind, AssetSet, Document, DocumentComposer, ExportOptions, Exporter, FontSet, ImageAsset,
    Preview, SaveToDirectory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn load_asset(path: Option<String>) -> Result<Option<ImageAsset>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(ImageAsset::decode(&std::fs::read(path)?)?)),
        None => Ok(None),
    }
}

fn load_fonts() -> Result<FontSet, Box<dyn std::error::Error>> {
    if let (Some(regular), Some(bold)) = (
        std::env::var_os("LETTER_FONT"),
        std::env::var_os("LETTER_FONT_BOLD"),
    ) {
        return Ok(FontSet::from_ttf(std::fs::read(regular)?, std::fs::read(bold)?)?);
    }
    Ok(FontSet::system().unwrap_or_else(|| {
        warn!("No serif font found, text is drawn as blocks");
        FontSet::estimated()
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with debug level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let output_dir = args.next().unwrap_or_else(|| ".".to_string());
    let signature = load_asset(args.next())?;
    let stamp = load_asset(args.next())?;

    let mut assets = AssetSet::new();
    assets.replace(AssetKind::Signature, signature);
    assets.replace(AssetKind::Stamp, stamp);

    let composer = DocumentComposer::default().with_fonts(load_fonts()?);
    let preview = Preview::new(composer, Document::default(), assets).into_handle();
    preview.write().mount(1024.0)?;

    let exporter = Exporter::new(Arc::new(SaveToDirectory::new(output_dir)))
        .with_options(ExportOptions::default().with_settle_delay(Duration::from_millis(50)));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let outcome = runtime.block_on(exporter.export(&preview))?;

    println!(
        "Saved {} ({} bytes)",
        outcome
            .receipt
            .path
            .map(|p| p.display().to_string())
            .unwrap_or(outcome.receipt.file_name),
        outcome.receipt.size
    );
    println!("Indicator: {}", exporter.indicator().label());
    Ok(())
}
