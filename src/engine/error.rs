//! Execution engine error types.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort a run.
///
/// None of these are retried inside the engine. The first one raised stops
/// the run and is handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The step list is missing or malformed. The run never starts.
    #[error("Invalid script configuration: {message}")]
    ConfigShape { message: String },

    /// A compiled step names an operation type nobody registered.
    #[error("Step {} ('{step}'): unknown operation type '{kind}'", .index + 1)]
    UnknownOperation { step: String, index: usize, kind: String },

    /// The operation itself failed.
    #[error("Step {} ('{step}') failed: {source}", .index + 1)]
    OperationFailed {
        step: String,
        index: usize,
        kind: String,
        #[source]
        source: anyhow::Error,
    },

    /// A step field could not be rendered.
    #[error("Step {} ('{step}'): template error: {source}", .index + 1)]
    Template {
        step: String,
        index: usize,
        #[source]
        source: TemplateError,
    },
}

impl EngineError {
    /// Build a [`EngineError::ConfigShape`] from anything printable.
    pub fn config_shape(message: impl Into<String>) -> Self {
        Self::ConfigShape { message: message.into() }
    }

    /// Zero-based index of the step that failed, if the error belongs to one.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::ConfigShape { .. } => None,
            Self::UnknownOperation { index, .. }
            | Self::OperationFailed { index, .. }
            | Self::Template { index, .. } => Some(*index),
        }
    }
}

/// Errors raised while rendering a template string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `{{` with no matching `}}`.
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    /// Placeholder body is empty or is not a plain key path.
    #[error("invalid placeholder {placeholder:?}")]
    InvalidPlaceholder { placeholder: String },

    /// No value for the key (strict mode only).
    #[error("unresolved placeholder {key:?}")]
    Unresolved { key: String },
}

/// Lookup of an operation type that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation type: {0}")]
pub struct UnknownOperation(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_use_one_based_step_numbers() {
        let err = EngineError::UnknownOperation {
            step: "scaffold".to_string(),
            index: 2,
            kind: "make_coffee".to_string(),
        };
        assert_eq!(err.to_string(), "Step 3 ('scaffold'): unknown operation type 'make_coffee'");
        assert_eq!(err.step_index(), Some(2));
    }

    #[test]
    fn test_operation_failure_keeps_cause() {
        let err = EngineError::OperationFailed {
            step: "mkdir".to_string(),
            index: 0,
            kind: "create_directory".to_string(),
            source: anyhow::anyhow!("permission denied"),
        };

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("permission denied"));
    }

    #[test]
    fn test_config_shape_has_no_step() {
        let err = EngineError::config_shape("missing 'steps' list");
        assert!(err.step_index().is_none());
        assert!(err.to_string().contains("missing 'steps' list"));
    }
}
