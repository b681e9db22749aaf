//! Step dispatcher.
//!
//! Runs a script's steps strictly in order: compile against the current
//! context, look up the operation, await it, and record the answer when the
//! step was an `ask_user` prompt.

use std::time::{Duration, Instant};

use serde_json::Value;

use super::context::{Context, Utils};
use super::error::{EngineError, EngineResult};
use super::registry::OperationRegistry;
use super::script::{ScriptConfig, Step};
use super::template::{compile_step, render_value, CompiledStep, TemplateMode};

/// Operation type whose result is recorded as a user answer.
pub const ASK_USER: &str = "ask_user";

/// Field of an `ask_user` step naming the variable the answer is stored under.
pub const VARIABLE_FIELD: &str = "variable";

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Executing the step at this index
    Running(usize),
    Completed,
    /// Stopped at the step at this index
    Failed(usize),
}

/// Record of a step that completed.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Position in the script (zero-based)
    pub index: usize,

    /// Compiled step name
    pub name: String,

    /// Operation type
    pub kind: String,

    /// Time spent in the operation
    pub duration: Duration,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Steps in execution order
    pub steps: Vec<StepRecord>,

    /// Wall time of the whole run
    pub duration: Duration,
}

/// Executes scripts against a registry of operations.
#[derive(Debug)]
pub struct Engine {
    /// Available operations
    registry: OperationRegistry,

    /// Context of the current (or last) run
    context: Context,

    /// Treatment of unresolved placeholders
    mode: TemplateMode,

    /// Engine state
    state: RunState,
}

impl Engine {
    /// Create an engine over `registry`.
    pub fn new(registry: OperationRegistry, utils: Utils) -> Self {
        Self {
            registry,
            context: Context::new(serde_json::Map::new(), utils),
            mode: TemplateMode::default(),
            state: RunState::Idle,
        }
    }

    /// Set how unresolved placeholders are treated.
    pub fn with_template_mode(mut self, mode: TemplateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Get the current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Context of the current or most recent run.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Registered operations.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Run every step of `config` in order.
    ///
    /// Each call starts from a fresh context holding the config's project
    /// metadata. The first failing step ends the run; steps after it never
    /// execute and nothing already done is undone.
    pub async fn execute(&mut self, config: &ScriptConfig) -> EngineResult<RunReport> {
        self.context = Context::new(config.project.clone(), self.context.utils().clone());
        let logger = self.context.utils().logger();
        let started = Instant::now();
        let mut steps = Vec::with_capacity(config.steps.len());

        for (index, step) in config.steps.iter().enumerate() {
            self.state = RunState::Running(index);
            logger.info(format_args!("Executing step: {}", step.name()));

            match self.execute_step(index, step).await {
                Ok(record) => steps.push(record),
                Err(e) => {
                    self.state = RunState::Failed(index);
                    logger.error(format_args!("Execution stopped: {e}"));
                    return Err(e);
                }
            }
        }

        self.state = RunState::Completed;
        Ok(RunReport { steps, duration: started.elapsed() })
    }

    /// Execute a single step against the current context.
    async fn execute_step(&mut self, index: usize, step: &Step) -> EngineResult<StepRecord> {
        let compiled = compile_step(step, &self.context, self.mode).map_err(|source| {
            EngineError::Template { step: step.name().to_string(), index, source }
        })?;

        let operation =
            self.registry.resolve(compiled.kind()).map_err(|_| EngineError::UnknownOperation {
                step: compiled.name().to_string(),
                index,
                kind: compiled.kind().to_string(),
            })?;

        let variable = if compiled.kind() == ASK_USER {
            Some(answer_variable(index, &compiled)?)
        } else {
            None
        };

        tracing::debug!(step = compiled.name(), kind = compiled.kind(), "Dispatching step");

        let start = Instant::now();
        let result = operation.execute(&compiled, &self.context).await.map_err(|source| {
            EngineError::OperationFailed {
                step: compiled.name().to_string(),
                index,
                kind: compiled.kind().to_string(),
                source,
            }
        })?;
        let duration = start.elapsed();

        if let Some(variable) = variable {
            let answer = answer_text(&result);
            tracing::debug!(variable = %variable, "Recorded answer");
            self.context.record_answer(variable, answer);
        }

        Ok(StepRecord {
            index,
            name: compiled.name().to_string(),
            kind: compiled.kind().to_string(),
            duration,
        })
    }

    /// Compile every step against the project metadata without running anything.
    ///
    /// Answers are not available, so placeholders that refer to them render
    /// empty (or fail in strict mode).
    pub fn preview(&self, config: &ScriptConfig) -> EngineResult<Vec<CompiledStep>> {
        let ctx = Context::new(config.project.clone(), self.context.utils().clone());

        config
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                compile_step(step, &ctx, self.mode).map_err(|source| EngineError::Template {
                    step: step.name().to_string(),
                    index,
                    source,
                })
            })
            .collect()
    }
}

fn answer_variable(index: usize, step: &CompiledStep) -> EngineResult<String> {
    step.str_field(VARIABLE_FIELD).map(str::to_string).ok_or_else(|| {
        EngineError::config_shape(format!(
            "step {} ('{}') is an {} step without a '{}' field",
            index + 1,
            step.name(),
            ASK_USER,
            VARIABLE_FIELD
        ))
    })
}

fn answer_text(result: &Value) -> String {
    render_value(result)
}
