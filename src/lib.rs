//! # Skriptor
//!
//! Run declarative setup scripts: an ordered list of steps, fetched from a
//! Skriptor server (or a local YAML file), each rendered against live run
//! values and handed to a named operation.
//!
//! ## Features
//!
//! - **Templates**: `{{ project_name }}`, `{{ user_input_username }}` in any step field
//! - **Interactive**: `ask_user` answers feed every later step
//! - **Pluggable**: operations are looked up by name in an open registry
//! - **LLM edits**: `update_file` rewrites files through Groq or OpenAI
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the script stored on the server under `node-api`
//! skriptor run node-api
//!
//! # Or a local file, failing on any unresolved placeholder
//! skriptor run demo --file demo.yaml --strict
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_literal_bound)]

pub mod config;
pub mod engine;
pub mod llm;
pub mod logging;
pub mod operations;
pub mod settings;
pub mod upload;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, ConfigSource, ScriptConfig, Step};
pub use engine::{
    CompiledStep, Context, Engine, EngineError, Operation, OperationRegistry, RunReport, RunState,
    TemplateMode, Utils,
};
pub use operations::{builtin_registry, builtin_registry_with};
pub use settings::Settings;
pub use upload::{LogUploader, RunStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "skriptor";
