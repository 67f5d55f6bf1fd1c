//! AI-assisted task breakdown.
//!
//! A [`SuggestionClient`] turns a task description into a handful of short
//! subtask strings. Clients never fail past their boundary: every problem
//! (missing key, network, bad status, malformed reply) is logged and turns
//! into an empty list.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Reasons a suggestion request produced nothing. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("API key not found (set {0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream response had no text")]
    EmptyResponse,
    #[error("could not parse upstream response: {0}")]
    Parse(#[source] serde_json::Error),
}

#[async_trait]
pub trait SuggestionClient: Send + Sync {
    /// Suggest subtasks for `task_text`. Empty on any failure.
    async fn suggest(&self, task_text: &str) -> Vec<String>;
}

/// The instruction sent upstream for a task description.
pub fn build_prompt(task_text: &str) -> String {
    format!(
        "Break down the following task into 3 to 5 concise, actionable subtasks.\n\
         Task: \"{}\"\n\
         Return only a JSON array of strings. Do not include markdown code blocks.",
        task_text
    )
}

/// Parse the model's text as a JSON array of strings.
///
/// Anything other than an array of strings is an error. Items are trimmed
/// and blank ones dropped.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>, SuggestError> {
    let items: Vec<String> = serde_json::from_str(text.trim()).map_err(SuggestError::Parse)?;
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
