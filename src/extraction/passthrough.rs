//! Pass-through adapter — no structural decomposition attempted.
//!
//! The vendor's payload shape is open-ended, so the canonical model degrades
//! to a single-page, single-document result whose text is the pretty-printed
//! payload itself.

use serde_json::Value;

use super::types::{PageExtraction, ProviderKind};
use super::ProviderError;

/// Wrap an opaque payload as a single-page extraction.
pub fn extract_page(payload: &Value) -> Result<PageExtraction, ProviderError> {
    let text = serde_json::to_string_pretty(payload).map_err(|e| ProviderError::Parse {
        provider: ProviderKind::Passthrough.display_name(),
        detail: format!("response not serializable: {e}"),
    })?;

    Ok(PageExtraction {
        page_index: 1,
        documents: Vec::new(),
        text,
    })
}
