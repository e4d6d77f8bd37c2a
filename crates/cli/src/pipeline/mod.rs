//! Pipeline orchestration module.

mod orchestrator;
mod source;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use source::{SourceSpec, TaskSource};
pub use stats::{PipelineStats, RunOutcome};
