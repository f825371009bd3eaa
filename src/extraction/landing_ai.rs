//! Pass-through vendor client — multipart upload to the agentic
//! document-analysis API.
//!
//! The response is treated as opaque JSON; no structural decomposition happens
//! here or in the adapter.

use serde_json::Value;

use super::types::{DocumentAnalysis, ProviderKind};
use super::ProviderError;
use crate::config::Settings;
use crate::document::{Document, DocumentKind};

/// Production document-analysis client.
#[derive(Debug)]
pub struct LandingAiClient {
    api_key: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl LandingAiClient {
    /// Build a client from settings; a missing key is a credentials error.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let api_key =
            settings
                .landing_ai_api_key
                .clone()
                .ok_or_else(|| ProviderError::Credentials {
                    provider: ProviderKind::Passthrough.display_name(),
                    detail: "LANDING_AI_API_KEY not set".into(),
                })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(settings.ocr_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            api_key,
            endpoint: settings.landing_ai_endpoint.clone(),
            client,
        })
    }
}

/// Multipart field name for one document kind.
pub fn upload_field(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "pdf",
        DocumentKind::Image => "image",
    }
}

impl DocumentAnalysis for LandingAiClient {
    fn analyze(&self, document: &Document, bytes: &[u8]) -> Result<Value, ProviderError> {
        let provider = ProviderKind::Passthrough.display_name();
        let _span = tracing::info_span!(
            "document_analysis_call",
            document = %document.file_name(),
            document_size = bytes.len(),
        )
        .entered();

        let part = reqwest::blocking::multipart::Part::bytes(bytes.to_vec())
            .file_name(document.file_name());
        let form =
            reqwest::blocking::multipart::Form::new().part(upload_field(document.kind), part);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Basic {}", self.api_key))
            .multipart(form)
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

/// Mock document-analysis client for testing.
pub struct MockDocumentAnalysis {
    response: Result<Value, String>,
}

impl MockDocumentAnalysis {
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

impl DocumentAnalysis for MockDocumentAnalysis {
    fn analyze(&self, _document: &Document, _bytes: &[u8]) -> Result<Value, ProviderError> {
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(ProviderError::Api {
                provider: ProviderKind::Passthrough.display_name(),
                status: 500,
                body: message.clone(),
            }),
        }
    }
}
