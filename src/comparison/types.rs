use serde::{Deserialize, Serialize};

use super::ComparisonError;

/// Which model runs the comparative analysis. Display names match the labels
/// the UI shell offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    OpenAiGpt4o,
    ClaudeSonnet,
}

impl ModelChoice {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAiGpt4o => "OpenAI GPT-4o",
            Self::ClaudeSonnet => "Claude Sonnet 3.5",
        }
    }

    /// The vendor's model identifier.
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::OpenAiGpt4o => "gpt-4o",
            Self::ClaudeSonnet => "claude-3-sonnet-20240229",
        }
    }
}

/// Output of one comparison request. Not persisted beyond the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub model_name: String,
    pub body_markdown: String,
}

/// Chat-model client abstraction (allows mocking).
pub trait ChatClient: Send + Sync {
    fn chat(&self, system: &str, user: &str) -> Result<String, ComparisonError>;
}

/// Mock chat client for testing — returns a configurable response.
pub struct MockChatClient {
    response: String,
}

impl MockChatClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl ChatClient for MockChatClient {
    fn chat(&self, _system: &str, _user: &str) -> Result<String, ComparisonError> {
        Ok(self.response.clone())
    }
}
