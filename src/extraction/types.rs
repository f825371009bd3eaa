use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderError;
use crate::document::{Document, Page};

/// Canonical output of one provider over one document.
///
/// Every adapter converges to this shape regardless of how the vendor
/// structures its payload; `raw_summary_text` is the rendered form used both
/// for display and as the verbatim input to the comparison step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub provider_name: String,
    pub pages: Vec<PageExtraction>,
    pub raw_summary_text: String,
}

/// Per-page extraction result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageExtraction {
    /// 1-based for rasterized pages; provider-supplied for native multi-page
    /// payloads.
    pub page_index: usize,
    /// Structured documents found on the page (expense-style providers only).
    pub documents: Vec<DocumentExtraction>,
    /// Free-form extracted text, possibly empty.
    pub text: String,
}

/// One structured document found by an expense-style provider.
///
/// Field pairs are `(field_type, field_value)` in source order. Line-item
/// groups nest group → item → field pairs, also order-preserving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub summary_fields: Vec<(String, String)>,
    pub line_item_groups: Vec<Vec<Vec<(String, String)>>>,
}

/// Which provider to run. The coordinator maps each kind to its vendor client
/// and adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Expense-style structured extraction with a plain-text fallback.
    Expense,
    /// Markdown-per-page extraction, native multi-page.
    Markdown,
    /// Opaque document analysis echoed verbatim.
    Passthrough,
}

impl ProviderKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Expense => "AWS Textract",
            Self::Markdown => "Mistral OCR",
            Self::Passthrough => "Landing AI",
        }
    }
}

/// Expense-OCR vendor client abstraction (allows mocking).
///
/// Both calls take raw document or page-image bytes and return the vendor's
/// untouched JSON payload.
pub trait ExpenseOcr: Send + Sync {
    fn analyze_expense(&self, image_bytes: &[u8]) -> Result<Value, ProviderError>;

    fn detect_document_text(&self, document_bytes: &[u8]) -> Result<Value, ProviderError>;
}

/// Markdown-page vendor client abstraction. Takes the whole document; the
/// client owns encoding (base64 payload vs. image data-URL).
pub trait MarkdownOcr: Send + Sync {
    fn process_document(&self, document: &Document, bytes: &[u8]) -> Result<Value, ProviderError>;
}

/// Pass-through document-analysis vendor client abstraction.
pub trait DocumentAnalysis: Send + Sync {
    fn analyze(&self, document: &Document, bytes: &[u8]) -> Result<Value, ProviderError>;
}

/// PDF rasterization abstraction (allows mocking).
///
/// Must return pages in source order with 1-based indices.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, path: &Path) -> Result<Vec<Page>, ProviderError>;
}
