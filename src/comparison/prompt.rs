//! Comparison prompt construction.
//!
//! The user prompt carries every provider's formatted summary verbatim, each
//! clearly labeled, plus a character-count overview. Providers are iterated in
//! map order (BTreeMap), so the prompt is deterministic for a given result
//! set.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// System prompt: the evaluation persona and output format.
pub const SYSTEM_PROMPT: &str = "\
You are an expert in OCR technology evaluation.
You will be given OCR results from different services for the same document.
Your task is to compare these results and determine which service performed best.
Provide a detailed analysis of the strengths and weaknesses of each OCR service.
Format your response in markdown.";

/// Build the user prompt from provider → formatted-summary pairs.
pub fn build_user_prompt(results: &BTreeMap<String, String>) -> String {
    let mut summary = String::from("OCR Results Summary:\n");
    for (service_name, result) in results {
        let _ = writeln!(summary, "- {service_name}: {} characters", result.len());
    }

    let mut formatted_results = String::new();
    for (service_name, result) in results {
        let _ = write!(
            formatted_results,
            "\n\n### {service_name} Results ###\n\n{result}\n\n{}\n\n",
            "-".repeat(50)
        );
    }

    format!(
        "Compare the following OCR services based on their results:\n\n\
         {summary}\n\
         Below are the detailed OCR results from each service. Each service's \
         results are clearly labeled.\n\
         {formatted_results}\n\
         Please provide a comprehensive analysis of which OCR service performed \
         best and why.\n\
         Consider factors such as:\n\
         1. Text accuracy and correctness\n\
         2. Formatting preservation\n\
         3. Handling of special characters and symbols\n\
         4. Recognition of tables and structured data\n\
         5. Overall completeness of the extracted text\n\
         6. Handling of multi-page documents (if applicable)\n\n\
         For each service, identify specific strengths and weaknesses with \
         examples from the results.\n\
         Conclude with a recommendation of which service would be best for this \
         type of document.\n"
    )
}
