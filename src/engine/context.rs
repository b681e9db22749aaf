//! Run context: project metadata, collected answers and side-channel utilities.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use uuid::Uuid;

/// State visible to templates and operations during a run.
///
/// The engine owns the context for the whole run. Operations get a shared
/// reference, so answers can only be recorded by the engine itself.
#[derive(Debug, Clone)]
pub struct Context {
    /// Project metadata from the script configuration
    project: Map<String, Value>,

    /// Answers collected by `ask_user` steps, keyed by variable name
    user_input: BTreeMap<String, String>,

    /// Logging and other side channels
    utils: Utils,
}

impl Context {
    /// Create a context for a run of the given project.
    pub fn new(project: Map<String, Value>, utils: Utils) -> Self {
        Self { project, user_input: BTreeMap::new(), utils }
    }

    /// Project metadata.
    pub fn project(&self) -> &Map<String, Value> {
        &self.project
    }

    /// All answers collected so far.
    pub fn user_input(&self) -> &BTreeMap<String, String> {
        &self.user_input
    }

    /// Answer recorded for `variable`, if its step already ran.
    pub fn answer(&self, variable: &str) -> Option<&str> {
        self.user_input.get(variable).map(String::as_str)
    }

    /// Side-channel utilities.
    pub fn utils(&self) -> &Utils {
        &self.utils
    }

    /// Data exposed to templates: `{"project": ..., "user_input": ...}`.
    pub fn template_data(&self) -> Map<String, Value> {
        let user_input = self
            .user_input
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>();

        let mut data = Map::new();
        data.insert("project".to_string(), Value::Object(self.project.clone()));
        data.insert("user_input".to_string(), Value::Object(user_input));
        data
    }

    pub(crate) fn record_answer(&mut self, variable: impl Into<String>, answer: impl Into<String>) {
        self.user_input.insert(variable.into(), answer.into());
    }
}

/// Handle to side-channel collaborators shared with operations.
#[derive(Debug, Clone)]
pub struct Utils {
    run_id: Uuid,
    log_file: Option<PathBuf>,
}

impl Utils {
    /// Create utilities for a fresh run.
    pub fn new() -> Self {
        Self { run_id: Uuid::new_v4(), log_file: None }
    }

    /// Attach the path of the run's log file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Unique id of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Log file written for this run, if file logging is enabled.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Logger tagging every event with this run's id.
    pub fn logger(&self) -> RunLogger {
        RunLogger { run_id: self.run_id }
    }
}

impl Default for Utils {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging sink for operations.
///
/// Events go through `tracing`, so they end up wherever the subscriber set
/// up in [`crate::logging`] sends them (console and run log file).
#[derive(Debug, Clone, Copy)]
pub struct RunLogger {
    run_id: Uuid,
}

impl RunLogger {
    pub fn debug(&self, message: impl Display) {
        tracing::debug!(run = %self.run_id, "{message}");
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(run = %self.run_id, "{message}");
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(run = %self.run_id, "{message}");
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(run = %self.run_id, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_template_data_shape() {
        let mut project = Map::new();
        project.insert("name".to_string(), json!("demo"));

        let mut ctx = Context::new(project, Utils::new());
        ctx.record_answer("username", "Alice");

        let data = Value::Object(ctx.template_data());
        assert_eq!(data, json!({ "project": { "name": "demo" }, "user_input": { "username": "Alice" } }));
    }

    #[test]
    fn test_answers_accumulate() {
        let mut ctx = Context::new(Map::new(), Utils::new());
        assert!(ctx.answer("a").is_none());

        ctx.record_answer("a", "1");
        ctx.record_answer("b", "2");

        assert_eq!(ctx.answer("a"), Some("1"));
        assert_eq!(ctx.user_input().len(), 2);
    }

    #[test]
    fn test_utils_log_file() {
        let utils = Utils::new();
        assert!(utils.log_file().is_none());

        let utils = utils.with_log_file("/tmp/run.log");
        assert_eq!(utils.log_file(), Some(Path::new("/tmp/run.log")));
    }

    #[test]
    fn test_each_run_gets_its_own_id() {
        assert_ne!(Utils::new().run_id(), Utils::new().run_id());
    }
}
