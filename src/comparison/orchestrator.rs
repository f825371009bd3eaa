//! Comparison orchestration — picks the model client and runs one analysis
//! over the full result set.

use std::collections::BTreeMap;

use tracing::info;

use super::anthropic::AnthropicClient;
use super::openai::OpenAiClient;
use super::prompt;
use super::types::{ChatClient, ComparisonReport, ModelChoice};
use super::ComparisonError;
use crate::config::Settings;

/// Compare formatted OCR summaries with the chosen model.
///
/// A missing credential surfaces as `NotConfigured`, which callers render as
/// an informational message rather than a failure of the OCR run itself.
pub fn compare_results(
    results: &BTreeMap<String, String>,
    model: ModelChoice,
    settings: &Settings,
) -> Result<ComparisonReport, ComparisonError> {
    let client: Box<dyn ChatClient> = match model {
        ModelChoice::OpenAiGpt4o => Box::new(OpenAiClient::from_settings(settings)?),
        ModelChoice::ClaudeSonnet => Box::new(AnthropicClient::from_settings(settings)?),
    };
    compare_with_client(results, model, client.as_ref())
}

/// Trait-seam variant used by tests and alternative wirings.
pub fn compare_with_client(
    results: &BTreeMap<String, String>,
    model: ModelChoice,
    client: &dyn ChatClient,
) -> Result<ComparisonReport, ComparisonError> {
    if results.is_empty() {
        return Err(ComparisonError::NoResults);
    }

    let user_prompt = prompt::build_user_prompt(results);
    info!(
        model = model.display_name(),
        providers = results.len(),
        prompt_chars = user_prompt.len(),
        "Running OCR comparison"
    );

    let body_markdown = client.chat(prompt::SYSTEM_PROMPT, &user_prompt)?;

    Ok(ComparisonReport {
        model_name: model.display_name().to_string(),
        body_markdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::types::MockChatClient;

    fn results() -> BTreeMap<String, String> {
        BTreeMap::from([("AWS Textract".to_string(), "Acme".to_string())])
    }

    #[test]
    fn report_carries_model_name_and_body() {
        let client = MockChatClient::new("## Analysis\nTextract wins.");
        let report =
            compare_with_client(&results(), ModelChoice::OpenAiGpt4o, &client).unwrap();
        assert_eq!(report.model_name, "OpenAI GPT-4o");
        assert!(report.body_markdown.contains("Textract wins."));
    }

    #[test]
    fn empty_result_set_is_rejected() {
        let client = MockChatClient::new("unused");
        let err = compare_with_client(&BTreeMap::new(), ModelChoice::ClaudeSonnet, &client)
            .unwrap_err();
        assert!(matches!(err, ComparisonError::NoResults));
    }

    #[test]
    fn unconfigured_model_returns_not_configured() {
        let err = compare_results(
            &results(),
            ModelChoice::OpenAiGpt4o,
            &Settings::unconfigured(),
        )
        .unwrap_err();
        assert!(matches!(err, ComparisonError::NotConfigured { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
