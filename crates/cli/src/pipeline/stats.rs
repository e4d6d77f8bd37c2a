//! Pipeline statistics and metrics.

use std::fmt;
use std::time::Duration;

use contracts::Task;
use dispatcher::StatsSnapshot;
use observability::MetricsSummary;

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The quit sentinel reached the dispatcher through the source
    Completed,
    /// The timeout expired and the quit sentinel was submitted
    TimedOut,
    /// A shutdown signal arrived and the quit sentinel was submitted
    Interrupted,
    /// An invalid task aborted the stream
    Aborted { reason: String },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Aborted { reason } => write!(f, "aborted ({reason})"),
        }
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub outcome: RunOutcome,

    /// Name of the batch processor
    pub processor: String,

    /// Batch capacity
    pub capacity: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Final dispatcher counters
    pub counters: StatsSnapshot,

    /// Per-batch aggregates
    pub batch_metrics: MetricsSummary,

    /// Tasks left in the buffer by an aborted stream
    pub undelivered: Vec<Task>,
}

impl PipelineStats {
    /// Delivered tasks per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.counters.delivered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Aborted { .. })
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Outcome: {}", self.outcome);
        println!("   ├─ Processor: {}", self.processor);
        println!("   ├─ Capacity: {}", self.capacity);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   └─ Throughput: {:.2} tasks/s", self.throughput());

        let counters = &self.counters;
        println!("\n📦 Dispatcher");
        println!("   ├─ Tasks accepted: {}", counters.submitted);
        println!("   ├─ Tasks rejected: {}", counters.rejected);
        println!("   ├─ Batches delivered: {}", counters.batches);
        println!("   ├─ Tasks delivered: {}", counters.delivered);
        println!("   └─ Processor failures: {}", counters.processor_failures);

        println!("\n📈 Batch Metrics");
        println!("{}", self.batch_metrics);

        if !self.undelivered.is_empty() {
            println!("\n⚠️  Undelivered Tasks ({})", self.undelivered.len());
            for task in &self.undelivered {
                println!("   ├─ {} {}", task.kind(), task.payload());
            }
        }

        println!();
    }
}
