//! Operation registry.
//!
//! Maps operation type names (the `type` field of a step) to the code that
//! carries them out.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::context::Context;
use super::error::UnknownOperation;
use super::template::CompiledStep;

/// Something a step can ask the engine to do.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Run the operation for a compiled step.
    ///
    /// The returned value is only looked at for interactive (`ask_user`)
    /// steps, where it becomes the recorded answer.
    async fn execute(&self, step: &CompiledStep, ctx: &Context) -> anyhow::Result<Value>;

    /// One-line description shown by `skriptor operations`.
    fn description(&self) -> &str {
        ""
    }
}

/// Registry of operations keyed by type name.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `operation`, replacing any earlier binding.
    pub fn register(&mut self, name: impl Into<String>, operation: impl Operation + 'static) {
        self.register_arc(name, Arc::new(operation));
    }

    /// Bind `name` to a shared operation.
    pub fn register_arc(&mut self, name: impl Into<String>, operation: Arc<dyn Operation>) {
        let name = name.into();
        if self.operations.insert(name.clone(), operation).is_some() {
            tracing::debug!(operation = name, "Replaced registered operation");
        }
    }

    /// Look up the operation for a type name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Operation>, UnknownOperation> {
        self.operations.get(name).cloned().ok_or_else(|| UnknownOperation(name.to_string()))
    }

    /// Check whether a type name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Registered operations with their names, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Operation>)> {
        self.operations.iter().map(|(name, op)| (name.as_str(), op))
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
