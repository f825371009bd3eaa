pub mod types;
pub mod prompt;
pub mod openai;
pub mod anthropic;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("{model} credentials not configured ({detail})")]
    NotConfigured { model: String, detail: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("{model} API error (status {status}): {body}")]
    Api {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("No OCR results to compare")]
    NoResults,
}
