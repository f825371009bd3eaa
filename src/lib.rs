//! ocrlens — multi-provider OCR extraction, normalization, and comparison.
//!
//! The core folds structurally different vendor payloads (nested expense JSON,
//! per-page markdown JSON, raw document-analysis JSON, plain-text blocks) into
//! one canonical extraction model, renders it deterministically for
//! side-by-side review, and can ask a chat model for a comparative quality
//! analysis across providers. It is a library with no UI and no persistence;
//! callers own presentation and caching.

pub mod batch;
pub mod comparison;
pub mod config;
pub mod document;
pub mod extraction;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the library.
///
/// Honors `RUST_LOG`, falling back to the library default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
