//! Markdown-page vendor client — base64 document upload to the Mistral OCR
//! API.
//!
//! PDFs go up as a base64 document payload, images as a data-URL. Either way
//! the vendor handles multi-page input natively, so the coordinator calls this
//! client exactly once per document.

use base64::Engine as _;
use serde_json::Value;

use super::types::{MarkdownOcr, ProviderKind};
use super::ProviderError;
use crate::config::Settings;
use crate::document::{Document, DocumentKind};

const OCR_URL: &str = "https://api.mistral.ai/v1/ocr";
const OCR_MODEL: &str = "mistral-ocr-latest";

/// Production markdown-page OCR client.
#[derive(Debug)]
pub struct MistralClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl MistralClient {
    /// Build a client from settings; a missing key is a credentials error.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let api_key = settings
            .mistral_api_key
            .clone()
            .ok_or_else(|| ProviderError::Credentials {
                provider: ProviderKind::Markdown.display_name(),
                detail: "MISTRAL_API_KEY not set".into(),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(settings.ocr_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { api_key, client })
    }
}

/// Build the OCR request body for one document.
///
/// Exposed for tests; the payload shape differs by document kind.
pub fn build_payload(document: &Document, bytes: &[u8]) -> Result<Value, ProviderError> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    match document.kind {
        DocumentKind::Pdf => Ok(serde_json::json!({
            "model": OCR_MODEL,
            "document": {
                "type": "document_base64",
                "document_base64": encoded,
                "document_name": document.file_name(),
            }
        })),
        DocumentKind::Image => {
            let extension = document.extension();
            let mime_type = match extension.as_str() {
                "jpg" | "jpeg" => "image/jpeg".to_string(),
                "png" => "image/png".to_string(),
                _ => {
                    return Err(ProviderError::UnsupportedFile {
                        provider: ProviderKind::Markdown.display_name(),
                        extension,
                    })
                }
            };
            Ok(serde_json::json!({
                "model": OCR_MODEL,
                "document": {
                    "type": "image_url",
                    "image_url": format!("data:{mime_type};base64,{encoded}"),
                }
            }))
        }
    }
}

impl MarkdownOcr for MistralClient {
    fn process_document(&self, document: &Document, bytes: &[u8]) -> Result<Value, ProviderError> {
        let provider = ProviderKind::Markdown.display_name();
        let _span = tracing::info_span!(
            "markdown_ocr_call",
            document = %document.file_name(),
            document_size = bytes.len(),
        )
        .entered();

        let payload = build_payload(document, bytes)?;

        let response = self
            .client
            .post(OCR_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| ProviderError::Transport {
                provider,
                detail: if e.is_timeout() {
                    "request timed out".into()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Api {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        response.json().map_err(|e| ProviderError::Parse {
            provider,
            detail: e.to_string(),
        })
    }
}

/// Mock markdown-page client for testing — returns a fixed payload or error.
pub struct MockMarkdownOcr {
    response: Result<Value, String>,
}

impl MockMarkdownOcr {
    pub fn ok(response: Value) -> Self {
        Self {
            response: Ok(response),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl MarkdownOcr for MockMarkdownOcr {
    fn process_document(
        &self,
        _document: &Document,
        _bytes: &[u8],
    ) -> Result<Value, ProviderError> {
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(ProviderError::Api {
                provider: ProviderKind::Markdown.display_name(),
                status: 500,
                body: message.clone(),
            }),
        }
    }
}
