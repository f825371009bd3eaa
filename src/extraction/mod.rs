pub mod types;
pub mod sanitize;
pub mod expense;
pub mod plain_text;
pub mod markdown;
pub mod passthrough;
pub mod textract;
pub mod mistral;
pub mod landing_ai;
pub mod pdf_renderer;
pub mod coordinator;
pub mod format;

pub use types::*;
pub use sanitize::*;
pub use coordinator::*;
pub use format::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider}: credentials not configured ({detail})")]
    Credentials {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider}: transport error: {detail}")]
    Transport {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider}: API error (status {status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider}: unreadable response: {detail}")]
    Parse {
        provider: &'static str,
        detail: String,
    },

    #[error("unsupported file type .{extension} for {provider}")]
    UnsupportedFile {
        provider: &'static str,
        extension: String,
    },

    #[error("PDF rasterization failed: {0}")]
    Rasterize(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// The provider this error belongs to, when one is identifiable.
    ///
    /// Rasterization and I/O failures happen before any provider is involved.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::Credentials { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Api { provider, .. }
            | Self::Parse { provider, .. }
            | Self::UnsupportedFile { provider, .. } => Some(provider),
            Self::Rasterize(_) | Self::Io(_) => None,
        }
    }
}
