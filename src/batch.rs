//! Multi-provider batch runs with per-provider error capture.
//!
//! One provider's failure must never prevent the others from completing, so a
//! `ProviderError` is rendered into that provider's result slot as descriptive
//! text naming the provider and the cause. The returned map is a complete
//! replacement for any prior run — callers own caching, the core does not.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::document::Document;
use crate::extraction::{MultiPageCoordinator, ProviderKind};

/// Run each requested provider over the document, sequentially, collecting
/// one display string per provider.
pub fn run_providers(
    document: &Document,
    providers: &[ProviderKind],
    coordinator: &MultiPageCoordinator,
) -> BTreeMap<String, String> {
    let mut results = BTreeMap::new();

    for &provider in providers {
        let name = provider.display_name().to_string();
        match coordinator.run(document, provider) {
            Ok(result) => {
                info!(
                    provider = %name,
                    pages = result.pages.len(),
                    summary_chars = result.raw_summary_text.len(),
                    "Provider extraction complete"
                );
                results.insert(name, result.raw_summary_text);
            }
            Err(err) => {
                error!(provider = %name, error = %err, "Provider extraction failed");
                results.insert(
                    name.clone(),
                    format!("Error processing with {name}: {err}"),
                );
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::landing_ai::MockDocumentAnalysis;
    use crate::extraction::mistral::MockMarkdownOcr;
    use crate::extraction::pdf_renderer::MockRasterizer;
    use crate::extraction::types::{DocumentAnalysis, MarkdownOcr, PageRasterizer};
    use serde_json::json;
    use std::io::Write as _;
    use std::sync::Arc;

    fn temp_pdf() -> (tempfile::NamedTempFile, Document) {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4").unwrap();
        let document = Document::from_path(file.path()).unwrap();
        (file, document)
    }

    #[test]
    fn unconfigured_provider_does_not_block_configured_one() {
        let (_file, document) = temp_pdf();
        let coordinator = MultiPageCoordinator::from_parts(
            Err("AWS_ACCESS_KEY_ID not set".into()),
            Ok(Arc::new(MockMarkdownOcr::ok(json!({
                "pages": [{"index": 1, "markdown": "# Working fine"}],
            }))) as Arc<dyn MarkdownOcr>),
            Err("LANDING_AI_API_KEY not set".into()),
            Ok(Arc::new(MockRasterizer::new(1)) as Arc<dyn PageRasterizer>),
        );

        let results = run_providers(
            &document,
            &[ProviderKind::Expense, ProviderKind::Markdown],
            &coordinator,
        );

        assert_eq!(results.len(), 2);
        let textract = &results["AWS Textract"];
        assert!(textract.starts_with("Error processing with AWS Textract:"));
        assert!(textract.contains("AWS_ACCESS_KEY_ID"));
        assert!(results["Mistral OCR"].contains("# Working fine"));
    }

    #[test]
    fn every_requested_provider_gets_a_slot() {
        let (_file, document) = temp_pdf();
        let coordinator = MultiPageCoordinator::from_parts(
            Err("no aws".into()),
            Ok(Arc::new(MockMarkdownOcr::err("vendor down")) as Arc<dyn MarkdownOcr>),
            Ok(Arc::new(MockDocumentAnalysis::ok(json!({"ok": true})))
                as Arc<dyn DocumentAnalysis>),
            Ok(Arc::new(MockRasterizer::new(1)) as Arc<dyn PageRasterizer>),
        );

        let results = run_providers(
            &document,
            &[
                ProviderKind::Expense,
                ProviderKind::Markdown,
                ProviderKind::Passthrough,
            ],
            &coordinator,
        );

        assert_eq!(results.len(), 3);
        // Failures are descriptive, never silently dropped.
        assert!(results["Mistral OCR"].contains("vendor down"));
        assert!(results["Landing AI"].contains("\"ok\": true"));
    }

    #[test]
    fn rerun_fully_replaces_prior_output() {
        let (_file, document) = temp_pdf();
        let coordinator = MultiPageCoordinator::from_parts(
            Err("no aws".into()),
            Ok(Arc::new(MockMarkdownOcr::ok(json!({"pages": []}))) as Arc<dyn MarkdownOcr>),
            Err("no landing ai".into()),
            Ok(Arc::new(MockRasterizer::new(1)) as Arc<dyn PageRasterizer>),
        );

        let first = run_providers(&document, &[ProviderKind::Markdown], &coordinator);
        let second = run_providers(&document, &[ProviderKind::Markdown], &coordinator);
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }
}
