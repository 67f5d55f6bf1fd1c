//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SuggestError, SuggestionClient, build_prompt, parse_suggestions};
use crate::model::config::SuggestConfig;

/// Suggestion client backed by the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    /// Build a client from config, reading the API key from the
    /// configured environment variable. A missing key is only reported
    /// when a suggestion is requested.
    pub fn from_config(config: &SuggestConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(config, api_key)
    }

    pub fn new(config: &SuggestConfig, api_key: Option<String>) -> Self {
        GeminiClient {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    /// Single request, no retry. Errors are the caller's to log.
    pub async fn try_suggest(&self, task_text: &str) -> Result<Vec<String>, SuggestError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SuggestError::MissingApiKey(self.api_key_env.clone()))?;

        let request = GenerateRequest::for_prompt(build_prompt(task_text));
        tracing::debug!(model = %self.model, "requesting subtask suggestions");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SuggestError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(SuggestError::Parse)?;
        let text = parsed.text().ok_or(SuggestError::EmptyResponse)?;
        parse_suggestions(&text)
    }
}

#[async_trait]
impl SuggestionClient for GeminiClient {
    async fn suggest(&self, task_text: &str) -> Vec<String> {
        match self.try_suggest(task_text).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "received suggestions");
                items
            }
            Err(e) => {
                tracing::warn!(error = %e, "subtask suggestion failed");
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

impl GenerateRequest {
    fn for_prompt(prompt: String) -> Self {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: serde_json::json!({
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}
