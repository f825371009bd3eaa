//! Markdown-page adapter — maps a native multi-page markdown payload into the
//! canonical model.
//!
//! The vendor returns `pages[]`, each with an `index`, optional `dimensions`
//! (width/height/dpi), embedded `images[]`, and a `markdown` text block. Each
//! page becomes one `PageExtraction` whose text is a per-page section in the
//! payload's page order.

use std::fmt::Write as _;

use serde_json::Value;

use super::types::{PageExtraction, ProviderKind};
use super::ProviderError;

/// Map a markdown-page payload into per-page extractions.
pub fn extract_pages(payload: &Value) -> Result<Vec<PageExtraction>, ProviderError> {
    let pages = payload
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse {
            provider: ProviderKind::Markdown.display_name(),
            detail: "response has no pages array".into(),
        })?;

    Ok(pages.iter().map(extract_page).collect())
}

fn extract_page(page: &Value) -> PageExtraction {
    let page_index = page
        .get("index")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    let mut text = String::new();

    if let Some(dimensions) = page.get("dimensions") {
        let _ = writeln!(
            text,
            "Dimensions: {}x{} (DPI: {})",
            dimension(dimensions, "width"),
            dimension(dimensions, "height"),
            dimension(dimensions, "dpi"),
        );
    }

    if let Some(images) = page.get("images").and_then(Value::as_array) {
        let _ = writeln!(text, "Images: {}", images.len());
    }

    if let Some(markdown) = page.get("markdown").and_then(Value::as_str) {
        let _ = write!(text, "\nText Content:\n{markdown}\n");
    }

    PageExtraction {
        page_index,
        documents: Vec::new(),
        text,
    }
}

/// Render one dimension value, `N/A` when absent or non-numeric.
fn dimension(dimensions: &Value, key: &str) -> String {
    dimensions
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
