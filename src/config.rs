//! Environment-derived settings: provider credentials, endpoints, timeouts.
//!
//! Credentials are read once into a `Settings` value; a missing credential is
//! carried as `None` and surfaces later as a per-provider "not configured"
//! error, never a panic.

use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "ocrlens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default region for the expense-OCR provider when `AWS_REGION` is unset.
pub const DEFAULT_AWS_REGION: &str = "eu-west-1";

/// Default endpoint for the pass-through document-analysis provider.
pub const DEFAULT_LANDING_AI_ENDPOINT: &str =
    "https://api.va.landing.ai/v1/tools/agentic-document-analysis";

/// Default bounded timeout for a single vendor OCR call.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 120;

/// Default bounded timeout for a single comparison (LLM) call.
pub const DEFAULT_COMPARE_TIMEOUT_SECS: u64 = 300;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,ocrlens=debug"
}

/// Everything the vendor clients need, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: String,
    pub mistral_api_key: Option<String>,
    pub landing_ai_api_key: Option<String>,
    pub landing_ai_endpoint: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub ocr_timeout: Duration,
    pub compare_timeout: Duration,
}

impl Settings {
    /// Resolve settings from environment variables.
    ///
    /// Empty variables count as unset so a blank `.env` entry does not look
    /// like a configured credential.
    pub fn from_env() -> Self {
        Self {
            aws_access_key_id: env_opt("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: env_opt("AWS_SECRET_ACCESS_KEY"),
            aws_region: env_opt("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            mistral_api_key: env_opt("MISTRAL_API_KEY"),
            landing_ai_api_key: env_opt("LANDING_AI_API_KEY"),
            landing_ai_endpoint: env_opt("LANDING_AI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_LANDING_AI_ENDPOINT.to_string()),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            ocr_timeout: Duration::from_secs(
                env_opt("OCRLENS_OCR_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_OCR_TIMEOUT_SECS),
            ),
            compare_timeout: Duration::from_secs(
                env_opt("OCRLENS_COMPARE_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_COMPARE_TIMEOUT_SECS),
            ),
        }
    }

    /// Settings with nothing configured, for tests.
    pub fn unconfigured() -> Self {
        Self {
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_region: DEFAULT_AWS_REGION.to_string(),
            mistral_api_key: None,
            landing_ai_api_key: None,
            landing_ai_endpoint: DEFAULT_LANDING_AI_ENDPOINT.to_string(),
            openai_api_key: None,
            anthropic_api_key: None,
            ocr_timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
            compare_timeout: Duration::from_secs(DEFAULT_COMPARE_TIMEOUT_SECS),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
