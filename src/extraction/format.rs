//! Result formatting — deterministic textual rendering of the canonical model.
//!
//! The rendered string is both the end-user display text and the verbatim
//! input unit fed to the comparison step; there is no separate export
//! representation. Rendering is a pure function of the data.

use std::fmt::Write as _;

use super::types::{DocumentExtraction, PageExtraction};

/// Render the pages of one provider's extraction into the display summary.
pub fn render(provider_name: &str, pages: &[PageExtraction]) -> String {
    let mut out = format!("{provider_name} Analysis Summary:\n\n");

    for page in pages {
        let _ = writeln!(out, "--- PAGE {} ---", page.page_index);

        for (doc_idx, doc) in page.documents.iter().enumerate() {
            let _ = writeln!(out, "Document {}:", doc_idx + 1);
            render_document(&mut out, doc);
        }

        if !page.text.is_empty() {
            out.push_str(&page.text);
            if !page.text.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    out
}

fn render_document(out: &mut String, doc: &DocumentExtraction) {
    if !doc.summary_fields.is_empty() {
        out.push_str("  Summary Fields:\n");
        for (field_type, field_value) in &doc.summary_fields {
            let _ = writeln!(out, "    {field_type}: {field_value}");
        }
    }

    for (group_idx, group) in doc.line_item_groups.iter().enumerate() {
        let _ = writeln!(out, "  Line Item Group {}:", group_idx + 1);
        for (item_idx, item) in group.iter().enumerate() {
            let _ = writeln!(out, "    Item {}:", item_idx + 1);
            for (field_type, field_value) in item {
                let _ = writeln!(out, "      {field_type}: {field_value}");
            }
        }
    }
}
