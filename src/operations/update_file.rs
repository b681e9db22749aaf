//! `update_file`: rewrite a file through an LLM.
//!
//! Fields: `path`, `instructions`.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;

use super::fs::expand_path;
use crate::engine::{CompiledStep, Context, Operation};
use crate::llm::{FileEditor, LlmError};

/// The `update_file` operation.
pub struct UpdateFile {
    editor: Option<Arc<dyn FileEditor>>,
}

impl UpdateFile {
    /// Create over an editor; `None` makes every call fail as unconfigured.
    pub fn new(editor: Option<Arc<dyn FileEditor>>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl Operation for UpdateFile {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let path = expand_path(step.require_str("path")?);
        let instructions = step.require_str("instructions")?;

        let Some(editor) = &self.editor else {
            log.error(LlmError::NotConfigured);
            return Err(LlmError::NotConfigured.into());
        };

        log.info(format_args!("Updating file at: {}", path.display()));
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        log.debug(format_args!("Asking {} to update {}", editor.name(), path.display()));
        let updated = match editor.edit(&content, instructions).await {
            Ok(updated) => updated,
            Err(e) => {
                log.error(format_args!("Failed to update file: {e}"));
                return Err(e);
            }
        };

        tokio::fs::write(&path, updated)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log.info(format_args!("Updated file: {}", path.display()));

        Ok(Value::Null)
    }

    fn description(&self) -> &str {
        "Rewrite a file with an LLM following instructions"
    }
}
