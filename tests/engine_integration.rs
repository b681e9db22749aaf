//! End-to-end runs of the engine with the built-in operations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use skriptor::config::parse_script_str;
use skriptor::operations::ScriptedPrompter;
use skriptor::{
    builtin_registry_with, CompiledStep, Context, Engine, EngineError, Operation, RunState, Utils,
};
use tempfile::TempDir;

fn greeting_script(root: &str) -> String {
    format!(
        r#"
project:
  name: demo
  root: "{root}"
steps:
  - type: create_directory
    name: Create {{{{ project_name }}}}
    path: "{{{{ project_root }}}}/{{{{ project_name }}}}"
  - type: ask_user
    name: Ask name
    question: What is your name?
    variable: username
  - type: create_file
    name: Greeting for {{{{ user_input_username }}}}
    path: "{{{{ project_root }}}}/{{{{ project_name }}}}/{{{{ user_input_username }}}}.txt"
    content: "hi {{{{ user_input_username }}}}"
"#
    )
}

fn engine(answers: &[&str]) -> Engine {
    let prompter = Arc::new(ScriptedPrompter::new(answers.iter().copied()));
    Engine::new(builtin_registry_with(prompter, None), Utils::new())
}

#[tokio::test]
async fn test_greeting_scenario() {
    let temp = TempDir::new().unwrap();
    let config = parse_script_str(&greeting_script(temp.path().to_str().unwrap())).unwrap();

    let mut engine = engine(&["Alice"]);
    let report = engine.execute(&config).await.unwrap();

    assert_eq!(engine.state(), RunState::Completed);
    assert_eq!(report.steps.len(), 3);
    assert_eq!(report.steps[0].name, "Create demo");
    assert_eq!(report.steps[2].name, "Greeting for Alice");

    let greeting = temp.path().join("demo/Alice.txt");
    assert_eq!(std::fs::read_to_string(greeting).unwrap(), "hi Alice");
    assert_eq!(engine.context().answer("username"), Some("Alice"));
}

#[tokio::test]
async fn test_preview_leaves_answers_empty() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_str().unwrap().to_string();
    let config = parse_script_str(&greeting_script(&root)).unwrap();

    let steps = engine(&[]).preview(&config).unwrap();

    assert_eq!(steps[0].str_field("path"), Some(format!("{root}/demo").as_str()));
    assert_eq!(steps[2].str_field("path"), Some(format!("{root}/demo/.txt").as_str()));
    assert_eq!(steps[2].str_field("content"), Some("hi "));
    assert!(!temp.path().join("demo").exists());
}

#[tokio::test]
async fn test_update_file_without_llm_stops_run() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_str().unwrap();
    let config = parse_script_str(&format!(
        r#"
steps:
  - type: create_file
    name: Seed
    path: "{root}/notes.md"
    content: draft
  - type: update_file
    name: Polish
    path: "{root}/notes.md"
    instructions: make it nicer
  - type: create_file
    name: Never
    path: "{root}/never.md"
"#
    ))
    .unwrap();

    let mut engine = engine(&[]);
    let err = engine.execute(&config).await.unwrap_err();

    assert!(matches!(err, EngineError::OperationFailed { index: 1, .. }));
    assert_eq!(engine.state(), RunState::Failed(1));
    assert_eq!(std::fs::read_to_string(temp.path().join("notes.md")).unwrap(), "draft");
    assert!(!temp.path().join("never.md").exists());
}

/// Records the compiled `message` field of every call.
struct Echo;

#[async_trait]
impl Operation for Echo {
    async fn execute(&self, step: &CompiledStep, _ctx: &Context) -> anyhow::Result<Value> {
        Ok(json!(step.str_field("message").unwrap_or_default()))
    }
}

#[tokio::test]
async fn test_custom_operation_alongside_builtins() {
    let config = parse_script_str(
        r#"
project:
  owner:
    name: Ada
steps:
  - type: echo
    name: Hello
    message: "hello {{ project.owner.name }}"
  - type: ask_user
    question: Which color?
    variable: color
  - type: echo
    name: "Color {{ user_input_color }}"
"#,
    )
    .unwrap();

    let prompter = Arc::new(ScriptedPrompter::new(["teal"]));
    let mut registry = builtin_registry_with(prompter, None);
    registry.register("echo", Echo);

    let mut engine = Engine::new(registry, Utils::new());
    let report = engine.execute(&config).await.unwrap();

    assert_eq!(report.steps[2].name, "Color teal");
    // Only ask_user results become answers
    assert_eq!(engine.context().user_input().len(), 1);
}
