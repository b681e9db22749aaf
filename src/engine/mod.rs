//! Execution engine.
//!
//! Turns a loaded script into side effects: each step is compiled against
//! the run context and handed to the operation registered for its `type`.
//! Steps run one after another; answers from `ask_user` steps are visible to
//! every later step.

mod context;
mod dispatcher;
mod error;
mod flatten;
mod registry;
mod script;
mod template;

pub use context::{Context, RunLogger, Utils};
pub use dispatcher::{Engine, RunReport, RunState, StepRecord, ASK_USER, VARIABLE_FIELD};
pub use error::{EngineError, EngineResult, TemplateError, UnknownOperation};
pub use flatten::{flatten, FlattenedContext, MAX_FLATTEN_DEPTH};
pub use registry::{Operation, OperationRegistry};
pub use script::{ScriptConfig, Step};
pub use template::{
    compile_step, placeholders, render, render_value, CompiledStep, TemplateMode,
};
