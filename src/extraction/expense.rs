//! Expense-style adapter — maps a sanitized structured-extraction payload into
//! the canonical model.
//!
//! The vendor shape is `ExpenseDocuments[].SummaryFields[]` plus
//! `LineItemGroups[].LineItems[].LineItemExpenseFields[]`, every field carrying
//! `Type.Text` and `ValueDetection.Text`. Partially-missing optional fields
//! default to placeholder text; only a missing top-level key is an error.

use serde_json::Value;

use super::types::{DocumentExtraction, PageExtraction, ProviderKind};
use super::ProviderError;

/// Placeholder when a field's `Type.Text` is absent.
pub const UNKNOWN_FIELD_TYPE: &str = "Unknown";
/// Placeholder when a field's `ValueDetection.Text` is absent.
pub const MISSING_FIELD_VALUE: &str = "N/A";

/// Map a sanitized expense payload into one `PageExtraction`.
///
/// `page_index` is supplied by the caller: the coordinator numbers rasterized
/// pages 1..N, and single-image calls use 1.
pub fn extract_page(page_index: usize, payload: &Value) -> Result<PageExtraction, ProviderError> {
    let documents = payload
        .get("ExpenseDocuments")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse {
            provider: ProviderKind::Expense.display_name(),
            detail: "response has no ExpenseDocuments array".into(),
        })?;

    Ok(PageExtraction {
        page_index,
        documents: documents.iter().map(extract_document).collect(),
        text: String::new(),
    })
}

fn extract_document(doc: &Value) -> DocumentExtraction {
    let summary_fields = doc
        .get("SummaryFields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().map(field_pair).collect())
        .unwrap_or_default();

    let line_item_groups = doc
        .get("LineItemGroups")
        .and_then(Value::as_array)
        .map(|groups| groups.iter().map(extract_group).collect())
        .unwrap_or_default();

    DocumentExtraction {
        summary_fields,
        line_item_groups,
    }
}

fn extract_group(group: &Value) -> Vec<Vec<(String, String)>> {
    group
        .get("LineItems")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.get("LineItemExpenseFields")
                        .and_then(Value::as_array)
                        .map(|fields| fields.iter().map(field_pair).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Extract one `(type, value)` pair with the vendor's `Type.Text` /
/// `ValueDetection.Text` shape, defaulting when absent.
fn field_pair(field: &Value) -> (String, String) {
    let field_type = field
        .get("Type")
        .and_then(|t| t.get("Text"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_FIELD_TYPE);
    let field_value = field
        .get("ValueDetection")
        .and_then(|v| v.get("Text"))
        .and_then(Value::as_str)
        .unwrap_or(MISSING_FIELD_VALUE);
    (field_type.to_string(), field_value.to_string())
}
