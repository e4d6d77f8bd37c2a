//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! task value type, the processor trait, configuration structures and the
//! shared error type. Business crates depend on this crate, never the other
//! way around.
//!
//! ## Task Model
//! - A task is a `kind` tag plus an opaque JSON `payload`
//! - The kind `"quit"` (any ASCII case) is the end-of-stream sentinel

mod config;
mod error;
mod processor;
mod task;
mod task_kind;

pub use config::*;
pub use error::*;
pub use processor::*;
pub use task::*;
pub use task_kind::TaskKind;
