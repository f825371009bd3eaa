//! Multi-page coordination — decides single-shot vs per-page invocation and
//! folds per-page results back into one canonical `ExtractionResult`.
//!
//! The expense provider's primary API cannot take a multi-page PDF, so PDFs
//! are rasterized and analyzed page by page, merged in page-index order. The
//! markdown and pass-through providers take the whole document in one call.
//!
//! Fallback policy: when per-page structured extraction fails, the whole
//! document is retried once against the plain-text API. Partial per-page
//! results gathered before the failure are deliberately discarded — the
//! fallback replaces the result wholesale rather than splicing mixed
//! structured/plain pages together. A second failure propagates.

use std::sync::Arc;

use tracing::warn;

use super::types::{
    DocumentAnalysis, ExpenseOcr, ExtractionResult, MarkdownOcr, PageExtraction, PageRasterizer,
    ProviderKind,
};
use super::{expense, format, markdown, passthrough, plain_text, sanitize, ProviderError};
use crate::config::Settings;
use crate::document::{Document, DocumentKind};
use crate::extraction::landing_ai::LandingAiClient;
use crate::extraction::mistral::MistralClient;
use crate::extraction::pdf_renderer::PdfiumRasterizer;
use crate::extraction::textract::TextractClient;

/// Coordinates vendor clients, sanitization, adapters, and formatting for one
/// document at a time. Strictly sequential; no state is shared across calls.
///
/// Each seam is either a ready client or the reason it could not be built, so
/// one unconfigured provider never prevents the others from running.
pub struct MultiPageCoordinator {
    expense: Result<Arc<dyn ExpenseOcr>, String>,
    markdown: Result<Arc<dyn MarkdownOcr>, String>,
    analysis: Result<Arc<dyn DocumentAnalysis>, String>,
    rasterizer: Result<Arc<dyn PageRasterizer>, String>,
}

impl MultiPageCoordinator {
    /// Build a coordinator with every seam ready (the usual test wiring).
    pub fn new(
        expense: Arc<dyn ExpenseOcr>,
        markdown: Arc<dyn MarkdownOcr>,
        analysis: Arc<dyn DocumentAnalysis>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Self {
        Self::from_parts(Ok(expense), Ok(markdown), Ok(analysis), Ok(rasterizer))
    }

    /// Build a coordinator from per-seam results; an `Err` holds the reason
    /// that seam is unavailable and surfaces only when a run needs it.
    pub fn from_parts(
        expense: Result<Arc<dyn ExpenseOcr>, String>,
        markdown: Result<Arc<dyn MarkdownOcr>, String>,
        analysis: Result<Arc<dyn DocumentAnalysis>, String>,
        rasterizer: Result<Arc<dyn PageRasterizer>, String>,
    ) -> Self {
        Self {
            expense,
            markdown,
            analysis,
            rasterizer,
        }
    }

    /// Wire up production clients from settings. Never fails as a whole:
    /// providers with missing credentials (or a missing native renderer) are
    /// recorded as unavailable and error out individually when invoked.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_parts(
            TextractClient::from_settings(settings)
                .map(|c| Arc::new(c) as Arc<dyn ExpenseOcr>)
                .map_err(credential_detail),
            MistralClient::from_settings(settings)
                .map(|c| Arc::new(c) as Arc<dyn MarkdownOcr>)
                .map_err(credential_detail),
            LandingAiClient::from_settings(settings)
                .map(|c| Arc::new(c) as Arc<dyn DocumentAnalysis>)
                .map_err(credential_detail),
            PdfiumRasterizer::new()
                .map(|r| Arc::new(r) as Arc<dyn PageRasterizer>)
                .map_err(|e| match e {
                    ProviderError::Rasterize(detail) => detail,
                    other => other.to_string(),
                }),
        )
    }

    /// Run one provider over one document, producing the canonical result
    /// with its rendered summary text.
    pub fn run(
        &self,
        document: &Document,
        provider: ProviderKind,
    ) -> Result<ExtractionResult, ProviderError> {
        let _span = tracing::info_span!(
            "extraction_run",
            provider = provider.display_name(),
            document = %document.file_name(),
            kind = document.kind.as_str(),
        )
        .entered();

        let pages = match provider {
            ProviderKind::Expense => self.run_expense(document)?,
            ProviderKind::Markdown => {
                let client = self.markdown_client(provider)?;
                let bytes = document.read_bytes()?;
                let raw = client.process_document(document, &bytes)?;
                markdown::extract_pages(&raw)?
            }
            ProviderKind::Passthrough => {
                let client = self.analysis_client(provider)?;
                let bytes = document.read_bytes()?;
                let raw = client.analyze(document, &bytes)?;
                vec![passthrough::extract_page(&raw)?]
            }
        };

        let provider_name = provider.display_name().to_string();
        let raw_summary_text = format::render(&provider_name, &pages);
        Ok(ExtractionResult {
            provider_name,
            pages,
            raw_summary_text,
        })
    }

    fn run_expense(&self, document: &Document) -> Result<Vec<PageExtraction>, ProviderError> {
        let client = self.expense_client()?;

        match document.kind {
            DocumentKind::Image => {
                let bytes = document.read_bytes()?;
                let raw = client.analyze_expense(&bytes)?;
                Ok(vec![expense::extract_page(1, &sanitize::sanitize(&raw))?])
            }
            DocumentKind::Pdf => {
                // Rasterization failure is fatal for this document's per-page
                // path; it is not a vendor error and does not trigger fallback.
                let raster_pages = self.rasterizer()?.rasterize(&document.path)?;

                match analyze_pages(client, &raster_pages) {
                    Ok(pages) => Ok(pages),
                    Err(primary) => {
                        warn!(
                            error = %primary,
                            "Per-page structured extraction failed; retrying whole \
                             document against the plain-text API (partial page \
                             results discarded)"
                        );
                        let bytes = document.read_bytes()?;
                        let raw = client.detect_document_text(&bytes)?;
                        Ok(vec![plain_text::extract_page(
                            1,
                            &sanitize::sanitize(&raw),
                        )?])
                    }
                }
            }
        }
    }

    fn expense_client(&self) -> Result<&dyn ExpenseOcr, ProviderError> {
        self.expense
            .as_ref()
            .map(|c| c.as_ref())
            .map_err(|detail| ProviderError::Credentials {
                provider: ProviderKind::Expense.display_name(),
                detail: detail.clone(),
            })
    }

    fn markdown_client(&self, provider: ProviderKind) -> Result<&dyn MarkdownOcr, ProviderError> {
        self.markdown
            .as_ref()
            .map(|c| c.as_ref())
            .map_err(|detail| ProviderError::Credentials {
                provider: provider.display_name(),
                detail: detail.clone(),
            })
    }

    fn analysis_client(
        &self,
        provider: ProviderKind,
    ) -> Result<&dyn DocumentAnalysis, ProviderError> {
        self.analysis
            .as_ref()
            .map(|c| c.as_ref())
            .map_err(|detail| ProviderError::Credentials {
                provider: provider.display_name(),
                detail: detail.clone(),
            })
    }

    fn rasterizer(&self) -> Result<&dyn PageRasterizer, ProviderError> {
        self.rasterizer
            .as_ref()
            .map(|r| r.as_ref())
            .map_err(|detail| ProviderError::Rasterize(detail.clone()))
    }
}

/// Analyze rasterized pages sequentially and merge in page-index order.
///
/// Ordering is a property of the merge, not of call completion: even if a
/// future implementation dispatches pages concurrently, the sort keeps the
/// output stable.
fn analyze_pages(
    client: &dyn ExpenseOcr,
    raster_pages: &[crate::document::Page],
) -> Result<Vec<PageExtraction>, ProviderError> {
    let mut pages = Vec::with_capacity(raster_pages.len());
    for page in raster_pages {
        let raw = client.analyze_expense(&page.image_png)?;
        pages.push(expense::extract_page(page.index, &sanitize::sanitize(&raw))?);
    }
    pages.sort_by_key(|p| p.page_index);
    Ok(pages)
}

fn credential_detail(error: ProviderError) -> String {
    match error {
        ProviderError::Credentials { detail, .. } => detail,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::landing_ai::MockDocumentAnalysis;
    use crate::extraction::mistral::MockMarkdownOcr;
    use crate::extraction::pdf_renderer::MockRasterizer;
    use crate::extraction::textract::MockExpenseOcr;
    use serde_json::json;
    use std::io::Write as _;
    use std::path::Path;

    fn expense_payload(vendor: &str) -> serde_json::Value {
        json!({
            "ExpenseDocuments": [{
                "SummaryFields": [
                    {"Type": {"Text": "VENDOR_NAME"}, "ValueDetection": {"Text": vendor}},
                ],
            }],
        })
    }

    fn coordinator_with(
        expense: MockExpenseOcr,
        rasterizer: MockRasterizer,
    ) -> MultiPageCoordinator {
        MultiPageCoordinator::new(
            Arc::new(expense),
            Arc::new(MockMarkdownOcr::err("unused")),
            Arc::new(MockDocumentAnalysis::err("unused")),
            Arc::new(rasterizer),
        )
    }

    fn temp_document(suffix: &str, contents: &[u8]) -> (tempfile::NamedTempFile, Document) {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents).unwrap();
        let document = Document::from_path(file.path()).unwrap();
        (file, document)
    }

    #[test]
    fn pdf_runs_expense_adapter_once_per_page_in_order() {
        let mock = Arc::new(
            MockExpenseOcr::new()
                .push_analyze_ok(expense_payload("Page One Vendor"))
                .push_analyze_ok(expense_payload("Page Two Vendor")),
        );
        let coordinator = MultiPageCoordinator::new(
            mock.clone(),
            Arc::new(MockMarkdownOcr::err("unused")),
            Arc::new(MockDocumentAnalysis::err("unused")),
            Arc::new(MockRasterizer::new(2)),
        );
        let document = Document::from_path(Path::new("invoice.pdf")).unwrap();

        let result = coordinator.run(&document, ProviderKind::Expense).unwrap();
        assert_eq!(mock.analyze_calls(), 2);
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[0].page_index, 1);
        assert_eq!(result.pages[1].page_index, 2);
        assert!(result.raw_summary_text.contains("--- PAGE 1 ---"));
        assert!(result.raw_summary_text.contains("--- PAGE 2 ---"));
        assert!(result.raw_summary_text.contains("Page One Vendor"));
    }

    #[test]
    fn image_goes_through_single_expense_call() {
        let (_file, document) = temp_document(".png", b"\x89PNG");
        let mock = MockExpenseOcr::new().push_analyze_ok(expense_payload("Acme"));
        let coordinator = coordinator_with(mock, MockRasterizer::new(0));

        let result = coordinator.run(&document, ProviderKind::Expense).unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].page_index, 1);
        assert!(result.raw_summary_text.contains("    VENDOR_NAME: Acme"));
    }

    #[test]
    fn per_page_failure_falls_back_to_whole_document_plain_text() {
        let (_file, document) = temp_document(".pdf", b"%PDF-1.4");
        // Page 1 succeeds, page 2 fails — the partial page-1 result must be
        // discarded in favor of the whole-document fallback.
        let mock = MockExpenseOcr::new()
            .push_analyze_ok(expense_payload("Partial Vendor"))
            .push_analyze_err("throttled")
            .with_detect_ok(json!({
                "Blocks": [
                    {"BlockType": "LINE", "Text": "Hello"},
                    {"BlockType": "LINE", "Text": "World"},
                ],
            }));
        let coordinator = coordinator_with(mock, MockRasterizer::new(2));

        let result = coordinator.run(&document, ProviderKind::Expense).unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].text, "Hello\nWorld\n");
        assert!(
            !result.raw_summary_text.contains("Partial Vendor"),
            "partial structured results must not survive the fallback"
        );
    }

    #[test]
    fn fallback_failure_propagates() {
        let (_file, document) = temp_document(".pdf", b"%PDF-1.4");
        let mock = MockExpenseOcr::new()
            .push_analyze_err("boom")
            .with_detect_err("also down");
        let coordinator = coordinator_with(mock, MockRasterizer::new(1));

        let err = coordinator.run(&document, ProviderKind::Expense).unwrap_err();
        match err {
            ProviderError::Api { body, .. } => assert_eq!(body, "also down"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rasterization_failure_is_fatal_and_does_not_fall_back() {
        let document = Document::from_path(Path::new("broken.pdf")).unwrap();
        let mock = MockExpenseOcr::new().with_detect_ok(json!({"Blocks": []}));
        let coordinator = coordinator_with(mock, MockRasterizer::failing());

        let err = coordinator.run(&document, ProviderKind::Expense).unwrap_err();
        assert!(matches!(err, ProviderError::Rasterize(_)));
    }

    #[test]
    fn fallback_detect_is_called_once_on_whole_document_not_per_page() {
        let (_file, document) = temp_document(".pdf", b"%PDF-1.4");
        let mock = Arc::new(
            MockExpenseOcr::new()
                .push_analyze_err("down")
                .with_detect_ok(json!({"Blocks": []})),
        );
        let coordinator = MultiPageCoordinator::new(
            mock.clone(),
            Arc::new(MockMarkdownOcr::err("unused")),
            Arc::new(MockDocumentAnalysis::err("unused")),
            Arc::new(MockRasterizer::new(3)),
        );

        coordinator.run(&document, ProviderKind::Expense).unwrap();
        // The first per-page call fails; the fallback is a single whole-doc
        // call, not one per rasterized page.
        assert_eq!(mock.analyze_calls(), 1);
        assert_eq!(mock.detect_calls(), 1);
    }

    #[test]
    fn markdown_provider_runs_single_call_on_whole_document() {
        let (_file, document) = temp_document(".pdf", b"%PDF-1.4");
        let coordinator = MultiPageCoordinator::new(
            Arc::new(MockExpenseOcr::new()),
            Arc::new(MockMarkdownOcr::ok(json!({
                "pages": [
                    {"index": 1, "markdown": "# Page one"},
                    {"index": 2, "markdown": "# Page two"},
                ],
            }))),
            Arc::new(MockDocumentAnalysis::err("unused")),
            Arc::new(MockRasterizer::failing()),
        );

        let result = coordinator.run(&document, ProviderKind::Markdown).unwrap();
        assert_eq!(result.provider_name, "Mistral OCR");
        assert_eq!(result.pages.len(), 2);
        assert!(result.raw_summary_text.contains("# Page one"));
    }

    #[test]
    fn passthrough_provider_echoes_payload() {
        let (_file, document) = temp_document(".png", b"\x89PNG");
        let coordinator = MultiPageCoordinator::new(
            Arc::new(MockExpenseOcr::new()),
            Arc::new(MockMarkdownOcr::err("unused")),
            Arc::new(MockDocumentAnalysis::ok(json!({"fields": {"total": "42"}}))),
            Arc::new(MockRasterizer::new(0)),
        );

        let result = coordinator
            .run(&document, ProviderKind::Passthrough)
            .unwrap();
        assert_eq!(result.pages.len(), 1);
        assert!(result.raw_summary_text.contains("\"total\": \"42\""));
    }

    #[test]
    fn unconfigured_seam_surfaces_credentials_error() {
        let coordinator = MultiPageCoordinator::from_parts(
            Err("AWS_ACCESS_KEY_ID not set".into()),
            Ok(Arc::new(MockMarkdownOcr::ok(json!({"pages": []}))) as Arc<dyn MarkdownOcr>),
            Err("LANDING_AI_API_KEY not set".into()),
            Ok(Arc::new(MockRasterizer::new(1)) as Arc<dyn PageRasterizer>),
        );
        let document = Document::from_path(Path::new("invoice.pdf")).unwrap();

        let err = coordinator.run(&document, ProviderKind::Expense).unwrap_err();
        match err {
            ProviderError::Credentials { provider, detail } => {
                assert_eq!(provider, "AWS Textract");
                assert!(detail.contains("AWS_ACCESS_KEY_ID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
