use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Broad document categories the pipeline distinguishes.
///
/// The split matters only where a provider's primary API cannot take a
/// multi-page PDF directly and the coordinator has to rasterize first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// One document selected for extraction, immutable for the duration of a
/// request. The kind is derived from the file extension (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    /// Build a `Document` from a path, deriving its kind from the extension.
    ///
    /// Returns `None` for extensions no provider supports; the caller decides
    /// how to report that (per-provider, not as a crash).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let kind = match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "jpg" | "jpeg" | "png" => DocumentKind::Image,
            _ => return None,
        };
        Some(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Lowercased file extension, empty when absent.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// File name component, used for provider upload metadata.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string()
    }

    /// Read the document bytes from disk.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// One rasterized unit of a PDF document.
///
/// Owned by the coordinator for the duration of a single per-page OCR call,
/// discarded after use — never persisted.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page index, preserved from the source document order.
    pub index: usize,
    /// PNG-encoded page image.
    pub image_png: Vec<u8>,
}
