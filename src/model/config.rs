use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the task and theme entries.
    /// If absent, the XDG data directory is used.
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Base URL of the generative-language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Marker prepended to the text of every suggested subtask
    #[serde(default = "default_subtask_prefix")]
    pub subtask_prefix: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            subtask_prefix: default_subtask_prefix(),
        }
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_subtask_prefix() -> String {
    "\u{21b3} ".to_string()
}
