//! Anthropic messages client for the comparison step.

use serde::{Deserialize, Serialize};

use super::types::{ChatClient, ModelChoice};
use super::ComparisonError;
use crate::config::Settings;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4000;

#[derive(Debug)]
pub struct AnthropicClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl AnthropicClient {
    /// Build a client from settings; a missing key is a not-configured error.
    pub fn from_settings(settings: &Settings) -> Result<Self, ComparisonError> {
        let api_key = settings
            .anthropic_api_key
            .clone()
            .ok_or_else(|| ComparisonError::NotConfigured {
                model: ModelChoice::ClaudeSonnet.display_name().to_string(),
                detail: "ANTHROPIC_API_KEY not set".into(),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(settings.compare_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { api_key, client })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl ChatClient for AnthropicClient {
    fn chat(&self, system: &str, user: &str) -> Result<String, ComparisonError> {
        let model = ModelChoice::ClaudeSonnet;
        let body = MessagesRequest {
            model: model.model_id(),
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| ComparisonError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ComparisonError::Api {
                model: model.display_name().to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| ComparisonError::MalformedResponse(e.to_string()))?;

        if parsed.content.is_empty() {
            return Err(ComparisonError::MalformedResponse(
                "response has no content blocks".into(),
            ));
        }

        Ok(parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = AnthropicClient::from_settings(&Settings::unconfigured()).unwrap_err();
        match err {
            ComparisonError::NotConfigured { model, detail } => {
                assert_eq!(model, "Claude Sonnet 3.5");
                assert!(detail.contains("ANTHROPIC_API_KEY"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn request_body_carries_system_separately() {
        let body = MessagesRequest {
            model: "claude-3-sonnet-20240229",
            system: "persona",
            messages: vec![Message {
                role: "user",
                content: "compare",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "persona");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
