//! `ask_user`: prompt for a value and hand it back to the engine.
//!
//! Fields: `question`, `variable`, optional `default`.

use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::engine::{CompiledStep, Context, Operation, VARIABLE_FIELD};

/// A question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Variable the answer will be stored under
    pub variable: String,

    /// Prompt text
    pub text: String,

    /// Value used when the answer is empty
    pub default: Option<String>,
}

/// Source of answers.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Return the raw answer to `question`.
    async fn ask(&self, question: &Question) -> anyhow::Result<String>;
}

/// Reads answers from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

#[async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&self, question: &Question) -> anyhow::Result<String> {
        let prompt = match &question.default {
            Some(default) => format!("? {} ({}) ", question.text, default),
            None => format!("? {} ", question.text),
        };

        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let mut stdout = io::stdout();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;

            let mut input = String::new();
            let read = io::stdin().lock().read_line(&mut input)?;
            if read == 0 {
                anyhow::bail!("stdin closed before an answer was given");
            }
            Ok(input.trim_end_matches(['\r', '\n']).to_string())
        })
        .await?
    }
}

/// Answers questions from a fixed queue, in order.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    /// Create a prompter that replies with `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: Mutex::new(answers.into_iter().map(Into::into).collect()) }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, question: &Question) -> anyhow::Result<String> {
        self.answers
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer left for '{}'", question.variable))
    }
}

/// Answers some variables from presets and asks `fallback` for the rest.
pub struct PresetPrompter {
    presets: HashMap<String, String>,
    fallback: Arc<dyn Prompter>,
}

impl PresetPrompter {
    /// Create from `variable -> answer` presets.
    pub fn new(presets: HashMap<String, String>, fallback: Arc<dyn Prompter>) -> Self {
        Self { presets, fallback }
    }

    /// Parse `key=value` assignments into presets.
    pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> anyhow::Result<HashMap<String, String>> {
        assignments
            .iter()
            .map(|a| {
                let a = a.as_ref();
                a.split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("invalid answer '{a}', expected variable=value"))
            })
            .collect()
    }
}

#[async_trait]
impl Prompter for PresetPrompter {
    async fn ask(&self, question: &Question) -> anyhow::Result<String> {
        match self.presets.get(&question.variable) {
            Some(answer) => Ok(answer.clone()),
            None => self.fallback.ask(question).await,
        }
    }
}

/// The `ask_user` operation.
pub struct AskUser {
    prompter: Arc<dyn Prompter>,
}

impl AskUser {
    /// Create the operation over a prompter.
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        Self { prompter }
    }
}

#[async_trait]
impl Operation for AskUser {
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value> {
        let log = ctx.utils().logger();
        let question = Question {
            variable: step.require_str(VARIABLE_FIELD)?.to_string(),
            text: step.require_str("question")?.to_string(),
            default: step.str_field("default").map(str::to_string),
        };

        log.info(format_args!("Prompting user with question: {}", question.text));
        let mut answer = self.prompter.ask(&question).await?;

        if answer.trim().is_empty() {
            if let Some(default) = &question.default {
                answer.clone_from(default);
            }
        }

        log.info(format_args!("User provided answer: {answer}"));
        Ok(Value::String(answer))
    }

    fn description(&self) -> &str {
        "Ask the user a question and store the answer in a variable"
    }
}
