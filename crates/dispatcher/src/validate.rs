//! Inbound item validation
//!
//! Every submission passes through [`validate`] before touching the buffer,
//! so a rejected value never shows up in a batch.

use contracts::{Inbound, Task};
use serde_json::Value;

use crate::error::DispatcherError;

/// Check that an inbound value is a well-formed task.
///
/// A JSON value qualifies when it is an object with a non-empty string
/// `kind` and, optionally, a `payload` of any shape. Other keys are ignored.
///
/// # Errors
/// `InvalidTask` describing the shape that was actually received.
pub fn validate(item: Inbound) -> Result<Task, DispatcherError> {
    match item {
        Inbound::Task(task) => {
            if task.kind().is_empty() {
                return Err(DispatcherError::invalid_task("task with an empty kind"));
            }
            Ok(task)
        }
        Inbound::Value(value) => task_from_value(value),
    }
}

fn task_from_value(value: Value) -> Result<Task, DispatcherError> {
    let Value::Object(mut map) = value else {
        return Err(DispatcherError::invalid_task(describe(&value)));
    };

    let kind = match map.remove("kind") {
        Some(Value::String(kind)) if !kind.is_empty() => kind,
        Some(Value::String(_)) => {
            return Err(DispatcherError::invalid_task("object with an empty \"kind\""));
        }
        Some(other) => {
            return Err(DispatcherError::invalid_task(format!(
                "object whose \"kind\" is {}",
                describe(&other)
            )));
        }
        None => {
            return Err(DispatcherError::invalid_task(
                "object without a string \"kind\" field",
            ));
        }
    };

    let payload = map.remove("payload").unwrap_or(Value::Null);
    Ok(Task::new(kind, payload))
}

/// Human-readable description of a JSON value's shape
pub fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {} elements", items.len()),
        Value::Object(map) => format!("object with {} fields", map.len()),
    }
}
