//! LLM integration.
//!
//! `update_file` steps hand a file's content and free-text instructions to an
//! LLM and write back whatever it returns.

mod openai;

pub use openai::{build_prompt, ChatCompletionsEditor, GROQ_BASE_URL, OPENAI_BASE_URL};

use async_trait::async_trait;

/// Something that can rewrite file content from instructions.
#[async_trait]
pub trait FileEditor: Send + Sync {
    /// Return the updated content.
    async fn edit(&self, content: &str, instructions: &str) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// LLM error types.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("GROQ_API_KEY or OPEN_AI_API_KEY are not set in the environment variables")]
    NotConfigured,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("No response from the LLM")]
    NoResponse,
}
