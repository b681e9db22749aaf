//! Operations that spawn external processes: `run_command` and
//! `clone_repository`.

use std::path::Path;
use std::process::{Output, Stdio};

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::fs::expand_path;
use crate::engine::{CompiledStep, Context, Operation, RunLogger};

/// Get the platform-specific shell.
fn get_shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

/// Run `cmd` to completion with captured output.
async fn capture(mut cmd: Command) -> std::io::Result<Output> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    cmd.output().await
}

fn log_output(log: RunLogger, output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        log.info(format_args!("Command output: {}", stdout.trim_end()));
    }
    if !stderr.trim().is_empty() {
        log.warn(format_args!("Command stderr: {}", stderr.trim_end()));
    }
}

/// `run_command`: run a shell command.
///
/// Fields: `command`, optional `cwd`. Non-zero exit fails the step.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunCommand;

#[async_trait]
impl Operation for RunCommand {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let command = step.require_str("command")?;

        let (shell, flag) = get_shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(command);
        if let Some(cwd) = step.str_field("cwd").filter(|c| !c.is_empty()) {
            cmd.current_dir(expand_path(cwd));
        }

        log.info(format_args!("Running command: {command}"));
        let output = capture(cmd).await.with_context(|| format!("Failed to spawn: {command}"))?;
        log_output(log, &output);

        if !output.status.success() {
            let code = output.status.code().map_or_else(|| "signal".to_string(), |c| c.to_string());
            log.error(format_args!("Command failed with exit code {code}"));
            anyhow::bail!(
                "Command `{command}` failed with exit code {code}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(Value::Null)
    }

    fn description(&self) -> &str {
        "Run a shell command"
    }
}

/// `clone_repository`: `git clone` a repository.
///
/// Fields: `repository_url`, optional `destination`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloneRepository;

#[async_trait]
impl Operation for CloneRepository {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let url = step.require_str("repository_url")?;
        let dest = step.str_field("destination").filter(|p| !p.is_empty()).map(expand_path);

        let mut cmd = Command::new("git");
        cmd.arg("clone").arg(url);
        if let Some(dest) = &dest {
            cmd.arg(dest);
        }

        let target = dest.as_deref().map_or_else(|| Path::new(".").display(), Path::display);
        log.info(format_args!("Cloning repository from {url} into {target}"));

        let output = capture(cmd).await.context("Failed to run git")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log.error(format_args!("Failed to clone repository: {}", stderr.trim()));
            anyhow::bail!("git clone {url} failed: {}", stderr.trim());
        }
        log.info(format_args!("Cloned repository: {url}"));

        Ok(Value::Null)
    }

    fn description(&self) -> &str {
        "Clone a git repository"
    }
}
