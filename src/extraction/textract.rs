//! Expense-OCR vendor client — SigV4-signed HTTP calls against the Textract
//! wire API.
//!
//! Requests are signed by hand (`aws-sigv4`) instead of going through the AWS
//! SDK so the response stays raw JSON: the sanitizer needs to see the payload
//! exactly as the vendor shaped it, geometry noise included.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use base64::Engine as _;
use serde_json::Value;

use super::types::{ExpenseOcr, ProviderKind};
use super::ProviderError;
use crate::config::Settings;

const SERVICE_NAME: &str = "textract";
const TARGET_ANALYZE_EXPENSE: &str = "Textract.AnalyzeExpense";
const TARGET_DETECT_TEXT: &str = "Textract.DetectDocumentText";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Production expense-OCR client.
///
/// One call per page image (primary API) or whole document (fallback API).
/// The wire protocol wants document bytes base64-encoded inside the JSON body.
#[derive(Debug)]
pub struct TextractClient {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    host: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl TextractClient {
    /// Build a client from settings; missing keys are a credentials error.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let provider = ProviderKind::Expense.display_name();
        let access_key_id =
            settings
                .aws_access_key_id
                .clone()
                .ok_or_else(|| ProviderError::Credentials {
                    provider,
                    detail: "AWS_ACCESS_KEY_ID not set".into(),
                })?;
        let secret_access_key =
            settings
                .aws_secret_access_key
                .clone()
                .ok_or_else(|| ProviderError::Credentials {
                    provider,
                    detail: "AWS_SECRET_ACCESS_KEY not set".into(),
                })?;

        let host = format!("{SERVICE_NAME}.{}.amazonaws.com", settings.aws_region);
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.ocr_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            access_key_id,
            secret_access_key,
            region: settings.aws_region.clone(),
            endpoint: format!("https://{host}/"),
            host,
            client,
        })
    }

    fn call(&self, target: &'static str, document_bytes: &[u8]) -> Result<Value, ProviderError> {
        let provider = ProviderKind::Expense.display_name();
        let _span = tracing::info_span!(
            "expense_ocr_call",
            target,
            document_size = document_bytes.len(),
        )
        .entered();

        let body = serde_json::json!({
            "Document": {
                "Bytes": base64::engine::general_purpose::STANDARD.encode(document_bytes),
            }
        })
        .to_string();

        let signed_headers = self.sign_request(target, body.as_bytes())?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", target)
            .body(body);
        for (name, value) in signed_headers {
            request = request.header(name, value);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                ProviderError::Transport {
                    provider,
                    detail: "request timed out".into(),
                }
            } else {
                ProviderError::Transport {
                    provider,
                    detail: e.to_string(),
                }
            }
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

    /// SigV4-sign one request; returns the headers to add (date, auth, and
    /// any session token).
    fn sign_request(
        &self,
        target: &str,
        body: &[u8],
    ) -> Result<Vec<(String, String)>, ProviderError> {
        let provider = ProviderKind::Expense.display_name();
        let transport = |detail: String| ProviderError::Transport { provider, detail };

        let identity = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            None,
            None,
            "settings",
        )
        .into();
        let signing_params: aws_sigv4::http_request::SigningParams = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SERVICE_NAME)
            .time(std::time::SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| transport(format!("signing parameters: {e}")))?
            .into();

        let headers = [
            ("host", self.host.as_str()),
            ("content-type", CONTENT_TYPE),
            ("x-amz-target", target),
        ];
        let signable = SignableRequest::new(
            "POST",
            self.endpoint.as_str(),
            headers.iter().copied(),
            SignableBody::Bytes(body),
        )
        .map_err(|e| transport(format!("unsignable request: {e}")))?;

        let (instructions, _signature) = sign(signable, &signing_params)
            .map_err(|e| transport(format!("request signing failed: {e}")))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

impl ExpenseOcr for TextractClient {
    fn analyze_expense(&self, image_bytes: &[u8]) -> Result<Value, ProviderError> {
        self.call(TARGET_ANALYZE_EXPENSE, image_bytes)
    }

    fn detect_document_text(&self, document_bytes: &[u8]) -> Result<Value, ProviderError> {
        self.call(TARGET_DETECT_TEXT, document_bytes)
    }
}

/// Mock expense-OCR client for testing.
///
/// `analyze_expense` pops queued responses in order (so per-page behavior can
/// differ); `detect_document_text` returns one fixed response. Call counts are
/// observable for invocation-order assertions.
pub struct MockExpenseOcr {
    analyze_queue: Mutex<VecDeque<Result<Value, String>>>,
    detect_response: Result<Value, String>,
    analyze_calls: AtomicUsize,
    detect_calls: AtomicUsize,
}

impl MockExpenseOcr {
    pub fn new() -> Self {
        Self {
            analyze_queue: Mutex::new(VecDeque::new()),
            detect_response: Err("detect_document_text not stubbed".into()),
            analyze_calls: AtomicUsize::new(0),
            detect_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_analyze_ok(self, response: Value) -> Self {
        self.analyze_queue
            .lock()
            .expect("mock queue lock")
            .push_back(Ok(response));
        self
    }

    pub fn push_analyze_err(self, message: &str) -> Self {
        self.analyze_queue
            .lock()
            .expect("mock queue lock")
            .push_back(Err(message.to_string()));
        self
    }

    pub fn with_detect_ok(mut self, response: Value) -> Self {
        self.detect_response = Ok(response);
        self
    }

    pub fn with_detect_err(mut self, message: &str) -> Self {
        self.detect_response = Err(message.to_string());
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    fn as_error(message: &str) -> ProviderError {
        ProviderError::Api {
            provider: ProviderKind::Expense.display_name(),
            status: 400,
            body: message.to_string(),
        }
    }
}

impl Default for MockExpenseOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseOcr for MockExpenseOcr {
    fn analyze_expense(&self, _image_bytes: &[u8]) -> Result<Value, ProviderError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        match self.analyze_queue.lock().expect("mock queue lock").pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Self::as_error(&message)),
            None => Err(Self::as_error("no queued analyze_expense response")),
        }
    }

    fn detect_document_text(&self, _document_bytes: &[u8]) -> Result<Value, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        match &self.detect_response {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(Self::as_error(message)),
        }
    }
}
