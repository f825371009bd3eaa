//! OpenAI chat-completions client for the comparison step.

use serde::{Deserialize, Serialize};

use super::types::{ChatClient, ModelChoice};
use super::ComparisonError;
use crate::config::Settings;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4000;

#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Build a client from settings; a missing key is a not-configured error.
    pub fn from_settings(settings: &Settings) -> Result<Self, ComparisonError> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or_else(|| ComparisonError::NotConfigured {
                model: ModelChoice::OpenAiGpt4o.display_name().to_string(),
                detail: "OPENAI_API_KEY not set".into(),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(settings.compare_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { api_key, client })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatClient for OpenAiClient {
    fn chat(&self, system: &str, user: &str) -> Result<String, ComparisonError> {
        let model = ModelChoice::OpenAiGpt4o;
        let body = ChatRequest {
            model: model.model_id(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ComparisonError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ComparisonError::MalformedResponse("response has no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = OpenAiClient::from_settings(&Settings::unconfigured()).unwrap_err();
        match err {
            ComparisonError::NotConfigured { model, detail } => {
                assert_eq!(model, "OpenAI GPT-4o");
                assert!(detail.contains("OPENAI_API_KEY"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn request_body_serializes_expected_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "system",
                content: "sys",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 4000);
    }
}
