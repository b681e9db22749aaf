//! Script parser.
//!
//! Parses YAML scripts into [`ScriptConfig`] and checks their shape before
//! anything runs.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};

use super::{ConfigError, ScriptConfig, Step};
use crate::engine::{placeholders, EngineError, ASK_USER, VARIABLE_FIELD};

/// Parse a script from a file.
pub fn parse_script(path: &Path) -> Result<ScriptConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_script_str(&content)
}

/// Parse a script from a string.
pub fn parse_script_str(content: &str) -> Result<ScriptConfig, ConfigError> {
    let mut document: serde_yaml::Value = serde_yaml::from_str(content)?;
    document.apply_merge()?;
    let config = validate_script(serde_yaml::from_value(document)?)?;

    for warning in lint_placeholders(&config) {
        tracing::warn!("{warning}");
    }

    Ok(config)
}

/// Check the shape of a parsed document and build the script from it.
pub fn validate_script(document: Value) -> Result<ScriptConfig, EngineError> {
    let Value::Object(mut document) = document else {
        return Err(EngineError::config_shape("configuration must be a mapping"));
    };

    let project = match document.remove("project") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(project)) => project,
        Some(_) => return Err(EngineError::config_shape("'project' must be a mapping")),
    };

    let steps = match document.remove("steps") {
        None | Some(Value::Null) => {
            return Err(EngineError::config_shape("missing 'steps' list"));
        }
        Some(Value::Array(steps)) => steps,
        Some(_) => return Err(EngineError::config_shape("'steps' must be a list")),
    };

    let steps = steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| validate_step(i, step))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScriptConfig { project, steps })
}

/// Validate a single step.
fn validate_step(index: usize, step: Value) -> Result<Step, EngineError> {
    let number = index + 1;

    let Value::Object(fields) = step else {
        return Err(EngineError::config_shape(format!("step {number} must be a mapping")));
    };

    match fields.get("type") {
        Some(Value::String(kind)) if !kind.trim().is_empty() => {}
        Some(Value::String(_)) | None => {
            return Err(EngineError::config_shape(format!("step {number} has no type")));
        }
        Some(_) => {
            return Err(EngineError::config_shape(format!("step {number}: 'type' must be a string")));
        }
    }

    if let Some(name) = fields.get("name") {
        if !name.is_string() {
            return Err(EngineError::config_shape(format!("step {number}: 'name' must be a string")));
        }
    }

    let step = Step::from_fields(fields);

    if step.kind() == Some(ASK_USER) && !step.get(VARIABLE_FIELD).is_some_and(Value::is_string) {
        return Err(EngineError::config_shape(format!(
            "step {number} ('{}') asks the user but declares no '{VARIABLE_FIELD}'",
            step.name()
        )));
    }

    Ok(step)
}

/// Find placeholders that refer to answers no earlier step collects.
///
/// These are not errors (such placeholders render empty), but they are
/// usually typos.
pub fn lint_placeholders(config: &ScriptConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut collected: HashSet<String> = HashSet::new();

    for (i, step) in config.steps.iter().enumerate() {
        let mut keys = Vec::new();
        collect_keys(step.fields(), &mut keys);

        for key in keys {
            if let Some(variable) = key.strip_prefix("user_input_") {
                if !collected.contains(variable) {
                    warnings.push(format!(
                        "Step {} ('{}') uses '{}' before any step asks for it",
                        i + 1,
                        step.name(),
                        variable
                    ));
                }
            }
        }

        if step.kind() == Some(ASK_USER) {
            if let Some(variable) = step.get(VARIABLE_FIELD).and_then(Value::as_str) {
                collected.insert(variable.to_string());
            }
        }
    }

    warnings
}

fn collect_keys(fields: &Map<String, Value>, keys: &mut Vec<String>) {
    for value in fields.values() {
        match value {
            Value::String(s) => keys.extend(placeholders(s)),
            Value::Object(nested) => collect_keys(nested, keys),
            _ => {}
        }
    }
}
