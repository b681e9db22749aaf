//! Filesystem operations: `create_directory` and `create_file`.

use std::path::PathBuf;

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;

use crate::engine::{CompiledStep, Context, Operation};

/// Expand a leading `~` in a step path.
pub(crate) fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// `create_directory`: create a directory and its parents.
///
/// Fields: `path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateDirectory;

#[async_trait]
impl Operation for CreateDirectory {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let path = expand_path(step.require_str("path")?);

        log.info(format_args!("Creating directory at: {}", path.display()));
        if let Err(e) = tokio::fs::create_dir_all(&path).await {
            log.error(format_args!("Failed to create directory: {e}"));
            return Err(e).with_context(|| format!("Failed to create directory {}", path.display()));
        }
        log.info(format_args!("Created directory: {}", path.display()));

        Ok(Value::Null)
    }

    fn description(&self) -> &str {
        "Create a directory (and any missing parents)"
    }
}

/// `create_file`: write a file, creating parent directories as needed.
///
/// Fields: `path`, optional `content` (an empty file when absent).
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateFile;

#[async_trait]
impl Operation for CreateFile {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let path = expand_path(step.require_str("path")?);
        let content = step.str_field("content").unwrap_or_default();

        log.info(format_args!("Creating file at: {}", path.display()));

        let result = async {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, content).await
        }
        .await;

        if let Err(e) = result {
            log.error(format_args!("Failed to create file: {e}"));
            return Err(e).with_context(|| format!("Failed to create file {}", path.display()));
        }
        log.info(format_args!("Created file: {}", path.display()));

        Ok(Value::Null)
    }

    fn description(&self) -> &str {
        "Write a file with the given content"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::engine::Utils;

    fn step(value: Value) -> CompiledStep {
        CompiledStep::new(value.as_object().cloned().unwrap())
    }

    fn ctx() -> Context {
        Context::new(serde_json::Map::new(), Utils::new())
    }

    #[tokio::test]
    async fn test_create_directory_with_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/c");

        CreateDirectory
            .execute(&step(json!({"type": "create_directory", "path": target.to_str().unwrap()})), &ctx())
            .await
            .unwrap();

        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_create_directory_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let s = step(json!({"type": "create_directory", "path": temp.path().to_str().unwrap()}));

        CreateDirectory.execute(&s, &ctx()).await.unwrap();
        CreateDirectory.execute(&s, &ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_directory_requires_path() {
        let err = CreateDirectory.execute(&step(json!({"type": "create_directory"})), &ctx()).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_create_file_writes_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested/hello.txt");

        CreateFile
            .execute(
                &step(json!({"type": "create_file", "path": target.to_str().unwrap(), "content": "hi Alice"})),
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hi Alice");
    }

    #[tokio::test]
    async fn test_create_file_without_content_is_empty() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("empty.txt");

        CreateFile
            .execute(&step(json!({"type": "create_file", "path": target.to_str().unwrap()})), &ctx())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "");
    }

    #[tokio::test]
    async fn test_create_file_over_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = CreateFile
            .execute(&step(json!({"type": "create_file", "path": temp.path().to_str().unwrap()})), &ctx())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to create file"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/projects");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("projects"));
        }
        assert_eq!(expand_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
