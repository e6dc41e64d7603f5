//! Downloadable export of the current document

use crate::error::{Error, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Exported Document
// ─────────────────────────────────────────────────────────────────────────────

/// A document snapshot ready to be handed to the user as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Suggested file name (the document id)
    pub file_name: String,
    /// Surface content, UTF-8 encoded
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    pub fn new(document: &str, content: impl Into<String>) -> Self {
        Self {
            file_name: document.to_string(),
            bytes: content.into().into_bytes(),
        }
    }

    /// MIME type offered for the download.
    pub fn content_type(&self) -> &'static str {
        "text/plain"
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Write `export` into `dir` under its suggested file name.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns `Error::FileWrite` if the file cannot be written.
pub fn write_to_dir(export: &ExportedDocument, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(&export.file_name);
    fs::write(&path, &export.bytes).map_err(|e| Error::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    info!("Exported {} ({} bytes) to {}", export.file_name, export.len(), path.display());
    Ok(path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
