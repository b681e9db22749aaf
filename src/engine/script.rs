//! Script schema definitions.
//!
//! A script is a YAML document with project metadata and an ordered list of
//! steps. Steps are kept as free-form mappings because every operation type
//! has its own fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dispatcher::{ASK_USER, VARIABLE_FIELD};

/// A loaded script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Project metadata, exposed to templates as `project_*`
    #[serde(default)]
    pub project: Map<String, Value>,

    /// Steps to execute, in order
    pub steps: Vec<Step>,
}

impl ScriptConfig {
    /// Get the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Variables declared by `ask_user` steps, in step order.
    pub fn declared_variables(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.kind() == Some(ASK_USER))
            .filter_map(|s| s.get(VARIABLE_FIELD).and_then(Value::as_str))
            .collect()
    }
}

/// A step as declared: `{ type, name, ...operation fields }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(Map<String, Value>);

impl Step {
    /// Build a step from its fields.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Declared operation type (before template rendering).
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Declared name, empty if the step has none.
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields, including `type` and `name`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_yaml() {
        let yaml = r#"
project:
  name: demo
  repo:
    url: https://example.com/demo.git

steps:
  - type: create_directory
    name: Make project dir
    path: "/tmp/{{project_name}}"

  - type: ask_user
    name: Ask name
    question: "Your name?"
    variable: username
"#;

        let config: ScriptConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.step_count(), 2);
        assert_eq!(config.project["name"], "demo");
        assert_eq!(config.steps[0].kind(), Some("create_directory"));
        assert_eq!(config.steps[0].name(), "Make project dir");
        assert_eq!(config.declared_variables(), vec!["username"]);
    }

    #[test]
    fn test_step_keeps_field_order() {
        let yaml = r"
type: run_command
name: build
command: make
cwd: /tmp
";

        let step: Step = serde_yaml::from_str(yaml).unwrap();
        let keys: Vec<_> = step.fields().keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["type", "name", "command", "cwd"]);
    }

    #[test]
    fn test_step_without_name() {
        let step: Step = serde_yaml::from_str("type: create_file").unwrap();
        assert_eq!(step.name(), "");
        assert!(step.get("path").is_none());
    }
}
