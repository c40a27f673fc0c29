//! Dispatch - hands a resolved command to whichever executor owns it
//!
//! Executors are optional capabilities (network tools, rooms, memory, ...).
//! An executor that is registered but offline reports itself unavailable;
//! the dispatcher turns that into an explicit error instead of a silent stub.

use std::sync::Arc;

use crate::error::DispatchError;
use crate::types::{ParsedCommand, Params};

/// Something that can carry out resolved intents
pub trait CommandExecutor: Send + Sync {
    /// Capability name, e.g. `network` or `memory`
    fn capability(&self) -> &str;

    /// Whether this executor handles `intent`
    fn supports(&self, intent: &str) -> bool;

    /// Whether the backing service is usable right now
    fn is_available(&self) -> bool {
        true
    }

    /// Run the intent and produce the user-facing reply
    fn execute(&self, intent: &str, params: &Params) -> String;
}

/// Ordered executor registry; the first executor supporting an intent owns it
pub struct Dispatcher {
    executors: Vec<Arc<dyn CommandExecutor>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    /// Register an executor
    pub fn register<E: CommandExecutor + 'static>(&mut self, executor: E) {
        self.register_shared(Arc::new(executor));
    }

    /// Register an executor that is shared elsewhere
    pub fn register_shared(&mut self, executor: Arc<dyn CommandExecutor>) {
        tracing::debug!(capability = executor.capability(), "Registered executor");
        self.executors.push(executor);
    }

    /// Executor that owns `intent`, if any
    pub fn executor_for(&self, intent: &str) -> Option<&Arc<dyn CommandExecutor>> {
        self.executors.iter().find(|e| e.supports(intent))
    }

    pub fn dispatch(&self, command: &ParsedCommand) -> Result<String, DispatchError> {
        self.execute(&command.intent, &command.params)
    }

    pub fn execute(&self, intent: &str, params: &Params) -> Result<String, DispatchError> {
        let executor = self
            .executor_for(intent)
            .ok_or_else(|| DispatchError::NoExecutor {
                intent: intent.to_string(),
            })?;

        if !executor.is_available() {
            tracing::warn!(
                capability = executor.capability(),
                intent,
                "Capability unavailable"
            );
            return Err(DispatchError::Unavailable {
                capability: executor.capability().to_string(),
                intent: intent.to_string(),
            });
        }

        tracing::trace!(capability = executor.capability(), intent, "Executing intent");
        Ok(executor.execute(intent, params))
    }

    /// Registered capabilities with their availability, in registration order
    pub fn capabilities(&self) -> Vec<(String, bool)> {
        self.executors
            .iter()
            .map(|e| (e.capability().to_string(), e.is_available()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
