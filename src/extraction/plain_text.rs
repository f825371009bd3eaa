//! Plain-text adapter — the fallback path when structured extraction is
//! unavailable or fails.
//!
//! Consumes a flat `Blocks[]` payload and keeps the text of every LINE block,
//! one line per block, in sequence order.

use serde_json::Value;

use super::types::{PageExtraction, ProviderKind};
use super::ProviderError;

/// Block type marking a full line of detected text.
const LINE_BLOCK_TYPE: &str = "LINE";

/// Map a sanitized plain-text payload into one `PageExtraction`.
pub fn extract_page(page_index: usize, payload: &Value) -> Result<PageExtraction, ProviderError> {
    let blocks = payload
        .get("Blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse {
            provider: ProviderKind::Expense.display_name(),
            detail: "response has no Blocks array".into(),
        })?;

    let mut text = String::new();
    for block in blocks {
        let is_line = block
            .get("BlockType")
            .and_then(Value::as_str)
            .map(|t| t == LINE_BLOCK_TYPE)
            .unwrap_or(false);
        if !is_line {
            continue;
        }
        text.push_str(block.get("Text").and_then(Value::as_str).unwrap_or(""));
        text.push('\n');
    }

    Ok(PageExtraction {
        page_index,
        documents: Vec::new(),
        text,
    })
}
