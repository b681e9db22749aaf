//! Step compilation.
//!
//! Every string field of a step is rendered as a template against the
//! flattened run context. Placeholders look like `{{ project_name }}`; the
//! triple-brace form `{{{ key }}}` is accepted and renders the same way, and
//! `{{! ... }}` is a comment. A dotted key (`project.name`) is looked up by its
//! underscore form.
//!
//! A placeholder with no value renders as an empty string unless the caller
//! asks for [`TemplateMode::Strict`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::context::Context;
use super::error::TemplateError;
use super::flatten::{flatten, FlattenedContext};
use super::script::Step;

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}_][\p{L}\p{N}_.\-]*$").expect("valid key pattern"));

/// How to treat placeholders that have no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplateMode {
    /// Render missing values as an empty string.
    #[default]
    Lenient,
    /// Fail on missing values.
    Strict,
}

/// A step with all placeholders resolved, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledStep(Map<String, Value>);

impl CompiledStep {
    /// Wrap already-resolved fields.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Operation type.
    pub fn kind(&self) -> &str {
        self.str_field("type").unwrap_or_default()
    }

    /// Step name (empty when the step has none).
    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or_default()
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field value, `None` if absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String field value, failing with a message naming the field.
    pub fn require_str(&self, key: &str) -> anyhow::Result<&str> {
        self.str_field(key).ok_or_else(|| {
            anyhow::anyhow!("'{}' step is missing required string field '{}'", self.kind(), key)
        })
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying fields.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Compile `step` against the current state of `ctx`.
///
/// The context is flattened afresh on every call, so a step compiled after an
/// answer was recorded sees that answer.
pub fn compile_step(
    step: &Step,
    ctx: &Context,
    mode: TemplateMode,
) -> Result<CompiledStep, TemplateError> {
    let data = ctx.template_data();
    let vars = flatten(&data);
    compile_fields(step.fields(), &vars, mode).map(CompiledStep)
}

fn compile_fields(
    fields: &Map<String, Value>,
    vars: &FlattenedContext<'_>,
    mode: TemplateMode,
) -> Result<Map<String, Value>, TemplateError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), compile_value(value, vars, mode)?)))
        .collect()
}

fn compile_value(
    value: &Value,
    vars: &FlattenedContext<'_>,
    mode: TemplateMode,
) -> Result<Value, TemplateError> {
    match value {
        Value::String(template) => render(template, vars, mode).map(Value::String),
        Value::Object(fields) => compile_fields(fields, vars, mode).map(Value::Object),
        other => Ok(other.clone()),
    }
}

/// Render one template string against flattened variables.
pub fn render(
    template: &str,
    vars: &FlattenedContext<'_>,
    mode: TemplateMode,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some(placeholder) = next_placeholder(rest, consumed)? {
        out.push_str(&rest[..placeholder.start]);
        if let Some(key) = placeholder.key {
            out.push_str(&resolve(key, vars, mode)?);
        }
        consumed += placeholder.end;
        rest = &rest[placeholder.end..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Keys referenced by well-formed placeholders in `template`, in order.
///
/// Malformed placeholders stop the scan; [`render`] reports those.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = template;

    while let Ok(Some(placeholder)) = next_placeholder(rest, 0) {
        if let Some(key) = placeholder.key {
            keys.push(normalize_key(key));
        }
        rest = &rest[placeholder.end..];
    }

    keys
}

/// A placeholder located in a template slice.
struct Placeholder<'a> {
    /// Byte offset of the opening braces
    start: usize,
    /// Byte offset just past the closing braces
    end: usize,
    /// Key to substitute; `None` for comments
    key: Option<&'a str>,
}

fn next_placeholder(text: &str, base: usize) -> Result<Option<Placeholder<'_>>, TemplateError> {
    let Some(start) = text.find("{{") else {
        return Ok(None);
    };

    let after_open = &text[start + 2..];
    let (body_offset, close) = if after_open.starts_with('{') { (1, "}}}") } else { (0, "}}") };
    let body_area = &after_open[body_offset..];

    let Some(body_len) = body_area.find(close) else {
        return Err(TemplateError::Unterminated { offset: base + start });
    };

    let body = body_area[..body_len].trim();
    let end = start + 2 + body_offset + body_len + close.len();

    if body.starts_with('!') {
        return Ok(Some(Placeholder { start, end, key: None }));
    }

    if !KEY_PATTERN.is_match(body) {
        return Err(TemplateError::InvalidPlaceholder { placeholder: body.to_string() });
    }

    Ok(Some(Placeholder { start, end, key: Some(body) }))
}

fn normalize_key(key: &str) -> String {
    key.replace('.', "_")
}

fn resolve(key: &str, vars: &FlattenedContext<'_>, mode: TemplateMode) -> Result<String, TemplateError> {
    let value = vars.get(key).or_else(|| vars.get(&normalize_key(key)));

    match (value, mode) {
        (Some(value), _) => Ok(render_value(value)),
        (None, TemplateMode::Lenient) => Ok(String::new()),
        (None, TemplateMode::Strict) => Err(TemplateError::Unresolved { key: key.to_string() }),
    }
}

/// Text form of a leaf value.
///
/// Arrays render as their elements joined with commas; null renders empty.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
