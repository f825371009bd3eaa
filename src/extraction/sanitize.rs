//! Response sanitization — strips geometry/position noise from provider
//! payloads before adaptation.
//!
//! Vendor OCR responses carry bounding boxes, polygons, and table-position
//! metadata at every nesting depth. None of it matters for text comparison,
//! and it dominates payload size. The sanitizer deletes a fixed set of noise
//! keys wherever they appear and leaves everything else untouched.

use serde_json::Value;

/// Payload keys carrying positional/geometric metadata, removed at every
/// nesting depth. Expanded list to catch vendor variations.
pub const NOISE_FIELDS: &[&str] = &[
    "Geometry",
    "BoundingBox",
    "Polygon",
    "Relationships",
    "RowIndex",
    "ColumnIndex",
    "RowSpan",
    "ColumnSpan",
    "CellGeometry",
    "TableGeometry",
    "TableBoundingBox",
    "TablePolygon",
];

/// Sanitize a provider payload with the default noise-field set.
///
/// Pure and idempotent: the output is structurally identical to the input
/// minus the deleted keys, scalars are never altered, and re-sanitizing a
/// sanitized payload yields an identical structure. Inputs originate from
/// JSON deserialization and are therefore acyclic.
pub fn sanitize(payload: &Value) -> Value {
    sanitize_with(payload, NOISE_FIELDS)
}

/// Sanitize with a caller-supplied noise-field set.
pub fn sanitize_with(payload: &Value, noise_fields: &[&str]) -> Value {
    let cleaned = strip_fields(payload, noise_fields);

    // Size-reduction telemetry, informational only.
    if tracing::enabled!(tracing::Level::DEBUG) {
        let original = payload.to_string().len();
        let reduced = cleaned.to_string().len();
        let percent = if original > 0 {
            (original - reduced) as f64 / original as f64 * 100.0
        } else {
            0.0
        };
        tracing::debug!(
            original_bytes = original,
            cleaned_bytes = reduced,
            reduction_percent = format!("{percent:.2}"),
            "Sanitized provider payload"
        );
    }

    cleaned
}

fn strip_fields(value: &Value, noise_fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !noise_fields.contains(&key.as_str()))
                .map(|(key, v)| (key.clone(), strip_fields(v, noise_fields)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| strip_fields(v, noise_fields)).collect())
        }
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn removes_noise_keys_at_top_level() {
        let payload = json!({
            "Text": "Invoice",
            "Geometry": {"BoundingBox": {"Left": 0.1}},
        });
        let clean = sanitize(&payload);
        assert_eq!(clean, json!({"Text": "Invoice"}));
    }

    #[test]
    fn removes_noise_keys_at_depth_three_and_below() {
        let payload = json!({
            "ExpenseDocuments": [{
                "SummaryFields": [{
                    "Type": {"Text": "TOTAL"},
                    "ValueDetection": {
                        "Text": "42.00",
                        "Geometry": {"Polygon": [[0, 0], [1, 1]]},
                    },
                }],
                "Relationships": [{"Type": "CHILD"}],
            }],
        });
        let clean = sanitize(&payload);
        assert_eq!(
            clean,
            json!({
                "ExpenseDocuments": [{
                    "SummaryFields": [{
                        "Type": {"Text": "TOTAL"},
                        "ValueDetection": {"Text": "42.00"},
                    }],
                }],
            })
        );
    }

    #[test]
    fn preserves_all_non_noise_keys() {
        let payload = json!({
            "a": {"b": {"c": {"d": 1, "RowIndex": 2}}},
            "list": [{"keep": true, "ColumnSpan": 3}],
        });
        let clean = sanitize(&payload);
        assert_eq!(
            clean,
            json!({
                "a": {"b": {"c": {"d": 1}}},
                "list": [{"keep": true}],
            })
        );
    }

    #[test]
    fn never_alters_scalars() {
        for scalar in [
            json!("text"),
            json!(3.5),
            json!(-7),
            json!(true),
            json!(null),
        ] {
            assert_eq!(sanitize(&scalar), scalar);
        }
    }

    #[test]
    fn is_idempotent() {
        let payload = json!({
            "Blocks": [
                {"BlockType": "LINE", "Text": "Hello", "Geometry": {"x": 1}},
                {"BlockType": "WORD", "Text": "Hi", "Polygon": []},
            ],
        });
        let once = sanitize(&payload);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_containers_pass_through() {
        assert_eq!(sanitize(&json!({})), json!({}));
        assert_eq!(sanitize(&json!([])), json!([]));
    }

    #[test]
    fn custom_noise_set_is_honored() {
        let payload = json!({"Geometry": 1, "Custom": 2, "Keep": 3});
        let clean = sanitize_with(&payload, &["Custom"]);
        // "Geometry" survives because it is not in the custom set.
        assert_eq!(clean, json!({"Geometry": 1, "Keep": 3}));
    }

    #[test]
    fn noise_key_inside_array_of_arrays() {
        let payload = json!([[{"BoundingBox": 1, "v": 2}]]);
        assert_eq!(sanitize(&payload), json!([[{"v": 2}]]));
    }
}
