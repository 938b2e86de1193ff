//! Original and stamped document storage

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const ORIGINAL_DIR: &str = "original";
const SIGNED_DIR: &str = "signed";
const SIGNED_PREFIX: &str = "signed-";

/// File-backed storage rooted at the uploads directory.
///
/// Originals are read from `<root>/original/<id>`, stamped output is written
/// to `<root>/signed/signed-<id>`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn original_dir(&self) -> PathBuf {
        self.root.join(ORIGINAL_DIR)
    }

    pub fn signed_dir(&self) -> PathBuf {
        self.root.join(SIGNED_DIR)
    }

    /// File name of the stamped copy of `id`
    pub fn signed_name(id: &str) -> String {
        format!("{}{}", SIGNED_PREFIX, id)
    }

    /// Read the original document bytes
    pub fn load_original(&self, id: &str) -> Result<Vec<u8>> {
        validate_document_id(id)?;
        let path = self.original_dir().join(id);

        if !path.exists() {
            return Err(Error::PdfNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(&path)?;

        // Validate PDF header
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: format!("{} is not a valid PDF file", id),
            });
        }

        Ok(data)
    }

    /// Write stamped bytes, creating the signed directory if needed.
    ///
    /// The write goes straight to the final path; a failure midway can leave a
    /// truncated file behind.
    pub fn write_signed(&self, id: &str, data: &[u8]) -> Result<PathBuf> {
        validate_document_id(id)?;
        let dir = self.signed_dir();
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(Self::signed_name(id));
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

/// Accept only a single plain file name
fn validate_document_id(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(&['/', '\\', '\0'][..])
        || Path::new(id).is_absolute();

    if invalid {
        return Err(Error::InvalidDocumentId { id: id.to_string() });
    }
    Ok(())
}
