//! Documents picked for upload
//!
//! Only single PDF files are accepted. A file that fails validation never
//! reaches the orchestrator.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} has no file name", path.display())]
    MissingFilename { path: PathBuf },
    #[error("Please upload a valid PDF file only ({filename} looks like {content_type})")]
    UnsupportedType {
        filename: String,
        content_type: String,
    },
    #[error("{filename} is empty")]
    Empty { filename: String },
}

/// A validated PDF ready to be sent to the document service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        if content_type != PDF_MIME {
            return Err(DocumentError::UnsupportedType {
                filename,
                content_type,
            });
        }
        if bytes.is_empty() {
            return Err(DocumentError::Empty { filename });
        }

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DocumentError::MissingFilename {
                path: path.to_path_buf(),
            })?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DocumentError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Self::new(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
