//! Script configuration.
//!
//! Scripts are YAML documents with project metadata and an ordered list of
//! steps. They are fetched from a Skriptor server or read from disk.

mod error;
mod loader;
mod parser;

pub use error::ConfigError;
pub use loader::{ConfigLoader, ConfigSource};
pub use parser::{lint_placeholders, parse_script, parse_script_str, validate_script};
pub use crate::engine::{ScriptConfig, Step};
