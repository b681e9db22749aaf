//! Built-in operations.
//!
//! | type               | fields                         |
//! |--------------------|--------------------------------|
//! | `ask_user`         | `question`, `variable`, `default` |
//! | `create_directory` | `path`                         |
//! | `create_file`      | `path`, `content`              |
//! | `clone_repository` | `repository_url`, `destination` |
//! | `run_command`      | `command`, `cwd`               |
//! | `update_file`      | `path`, `instructions`         |

mod ask_user;
mod fs;
mod process;
mod update_file;

use std::sync::Arc;

pub use ask_user::{AskUser, PresetPrompter, Prompter, Question, ScriptedPrompter, StdinPrompter};
pub use fs::{CreateDirectory, CreateFile};
pub use process::{CloneRepository, RunCommand};
pub use update_file::UpdateFile;

use crate::engine::{OperationRegistry, ASK_USER};
use crate::llm::{ChatCompletionsEditor, FileEditor};
use crate::settings::Settings;

/// Registry with every built-in operation, prompting on the terminal and
/// editing files with whichever LLM provider `settings` configures.
pub fn builtin_registry(settings: &Settings) -> OperationRegistry {
    let editor = match ChatCompletionsEditor::from_settings(settings) {
        Ok(editor) => Some(Arc::new(editor) as Arc<dyn FileEditor>),
        Err(e) => {
            tracing::debug!("update_file disabled: {e}");
            None
        }
    };
    builtin_registry_with(Arc::new(StdinPrompter), editor)
}

/// Registry with every built-in operation over the given collaborators.
pub fn builtin_registry_with(
    prompter: Arc<dyn Prompter>,
    editor: Option<Arc<dyn FileEditor>>,
) -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    registry.register(ASK_USER, AskUser::new(prompter));
    registry.register("create_directory", CreateDirectory);
    registry.register("create_file", CreateFile);
    registry.register("clone_repository", CloneRepository);
    registry.register("run_command", RunCommand);
    registry.register("update_file", UpdateFile::new(editor));
    registry
}
