//! Handing the finished file to the user

use crate::Result;
use crate::error::ExportError;
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Where a delivered file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub file_name: String,
    pub size: usize,
    /// Filesystem location, when delivered to disk
    pub path: Option<PathBuf>,
}

/// Sink for finished documents.
///
/// A delivery either stores the whole file or fails; it never leaves a
/// partial file behind.
pub trait Delivery: Send + Sync {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<DeliveryReceipt>;
}

/// Saves files into a directory, atomically
#[derive(Debug, Clone)]
pub struct SaveToDirectory {
    dir: PathBuf,
}

impl SaveToDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Delivery for SaveToDirectory {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<DeliveryReceipt> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(ExportError::AssemblyError(format!(
                "Invalid file name '{}'",
                file_name
            )));
        }
        let target = self.dir.join(file_name);

        // Written next to the target, then renamed into place
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| e.error)?;

        info!("Saved {} ({} bytes)", target.display(), bytes.len());
        Ok(DeliveryReceipt {
            file_name: file_name.to_string(),
            size: bytes.len(),
            path: Some(target),
        })
    }
}

/// A file handed to [`MemoryDelivery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Keeps delivered files in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDelivery {
    files: Arc<Mutex<Vec<DeliveredFile>>>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first
    pub fn files(&self) -> Vec<DeliveredFile> {
        self.files.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<DeliveryReceipt> {
        self.files.lock().push(DeliveredFile {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        debug!("Kept {} in memory ({} bytes)", file_name, bytes.len());
        Ok(DeliveryReceipt {
            file_name: file_name.to_string(),
            size: bytes.len(),
            path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = SaveToDirectory::new(dir.path());
        let receipt = delivery.deliver("Surat_Kerja_Test.pdf", b"%PDF-1.5").unwrap();

        let path = receipt.path.unwrap();
        assert_eq!(path, dir.path().join("Surat_Kerja_Test.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        assert_eq!(receipt.size, 8);

        // Only the target remains, no temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = SaveToDirectory::new(dir.path());
        delivery.deliver("a.pdf", b"first").unwrap();
        delivery.deliver("a.pdf", b"second").unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.pdf")).unwrap(), b"second");
    }

    #[test]
    fn test_save_rejects_path_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = SaveToDirectory::new(dir.path());
        assert!(delivery.deliver("../escape.pdf", b"x").is_err());
        assert!(delivery.deliver("", b"x").is_err());
    }

    #[test]
    fn test_missing_directory_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let delivery = SaveToDirectory::new(&missing);
        assert!(delivery.deliver("a.pdf", b"x").is_err());
        assert!(!missing.exists());
    }

    #[test]
    fn test_memory_delivery_collects() {
        let delivery = MemoryDelivery::new();
        assert!(delivery.is_empty());
        delivery.deliver("a.pdf", b"1").unwrap();
        let shared = delivery.clone();
        shared.deliver("b.pdf", b"22").unwrap();

        let files = delivery.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].file_name, "b.pdf");
        assert_eq!(files[1].bytes, b"22");
    }
}
