//! Task - the unit of work flowing through the dispatcher
//!
//! `Inbound` is what producers hand over before validation: either an
//! already-typed `Task` or a loosely-typed JSON value from external wiring.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TaskKind;

/// Immutable unit of work.
///
/// The payload is opaque to the dispatcher; only processors look inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    kind: TaskKind,
    #[serde(default)]
    payload: Value,
}

impl Task {
    /// Create a task with a payload
    pub fn new(kind: impl Into<TaskKind>, payload: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Create a task without payload (`null`)
    pub fn bare(kind: impl Into<TaskKind>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// The end-of-stream sentinel task
    pub fn quit() -> Self {
        Self::bare(TaskKind::sentinel())
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether this task ends the stream
    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }

    /// Split into kind and payload
    pub fn into_parts(self) -> (TaskKind, Value) {
        (self.kind, self.payload)
    }
}

/// A value submitted by a producer, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Typed task, only the kind still needs checking
    Task(Task),
    /// Untyped value, shape unknown
    Value(Value),
}

impl From<Task> for Inbound {
    fn from(task: Task) -> Self {
        Self::Task(task)
    }
}

impl From<Value> for Inbound {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Inbound {
    fn from(s: &str) -> Self {
        Self::Value(Value::String(s.to_string()))
    }
}

impl From<String> for Inbound {
    fn from(s: String) -> Self {
        Self::Value(Value::String(s))
    }
}
