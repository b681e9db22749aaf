//! OpenAI-compatible chat completions client.
//!
//! Groq and OpenAI expose the same `/chat/completions` API, so one client
//! serves both; only the base URL, key and model differ.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{FileEditor, LlmError};
use crate::settings::Settings;

/// Groq API base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that updates file contents based on instructions.";

/// Chat completions client used to rewrite files.
pub struct ChatCompletionsEditor {
    client: Client,
    provider: &'static str,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ChatCompletionsEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsEditor")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatCompletionsEditor {
    /// Create a Groq-backed editor.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", api_key, "llama-3.1-70b-versatile", GROQ_BASE_URL)
    }

    /// Create an OpenAI-backed editor.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", api_key, "gpt-4o-mini", OPENAI_BASE_URL)
    }

    fn new(
        provider: &'static str,
        api_key: impl Into<String>,
        model: &str,
        base_url: &str,
    ) -> Self {
        Self {
            client: Client::new(),
            provider,
            api_key: api_key.into(),
            model: model.to_string(),
            base_url: base_url.to_string(),
            max_tokens: 4000,
            temperature: 0.4,
            timeout: None,
        }
    }

    /// Pick a provider from settings: Groq first, then OpenAI.
    ///
    /// Requests use the settings' HTTP timeout.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let llm = &settings.llm;
        let editor = if let Some(key) = &llm.groq_api_key {
            Self::groq(key).with_model(&llm.groq_model)
        } else if let Some(key) = &llm.openai_api_key {
            Self::openai(key).with_model(&llm.openai_model)
        } else {
            return Err(LlmError::NotConfigured);
        };

        editor.with_limits(llm.max_tokens, llm.temperature).with_timeout(settings.http_timeout())
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ApiError(format!("failed to build HTTP client: {e}")))?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (for proxies or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the token limit and temperature.
    pub fn with_limits(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request timeout, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Make a request to the chat completions API.
    async fn request(&self, system: &str, user_message: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user_message.to_string() },
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("{} ({}): {}", self.provider, status, body)));
        }

        let response: ChatResponse =
            response.json().await.map_err(|e| LlmError::ApiError(e.to_string()))?;

        response.choices.into_iter().next().map(|c| c.message.content).ok_or(LlmError::NoResponse)
    }
}

#[async_trait]
impl FileEditor for ChatCompletionsEditor {
    async fn edit(&self, content: &str, instructions: &str) -> anyhow::Result<String> {
        let prompt = build_prompt(content, instructions);
        let updated = self.request(SYSTEM_PROMPT, &prompt).await?;
        Ok(updated.trim().to_string())
    }

    fn name(&self) -> &str {
        self.provider
    }
}

/// Build the user prompt asking for a rewritten file.
pub fn build_prompt(content: &str, instructions: &str) -> String {
    format!(
        "Given the following file content:\n\n{content}\n\n\
         Please update the file based on these instructions:\n\n{instructions}\n\n\
         Provide the full updated file content, return as a string. \
         Do not include any extra information.\n"
    )
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
