//! 批次分发指标收集模块
//!
//! 提供 Prometheus 指标记录函数，以及用于运行摘要的内存聚合器。

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// 批次投递原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// 缓冲区已满
    Full,
    /// 收到结束哨兵，投递剩余部分批次
    Final,
}

impl FlushReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Final => "final",
        }
    }
}

/// 记录一次任务提交 (校验通过)
pub fn record_task_submitted(kind: &str) {
    counter!(
        "taskpool_tasks_submitted_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录一次非法任务
pub fn record_task_rejected() {
    counter!("taskpool_tasks_rejected_total").increment(1);
}

/// 记录批次投递
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_batch_flushed, FlushReason};
///
/// let batch = buffer.drain();
/// record_batch_flushed(FlushReason::Full, batch.len());
/// ```
pub fn record_batch_flushed(reason: FlushReason, batch_len: usize) {
    counter!(
        "taskpool_batches_flushed_total",
        "reason" => reason.as_str()
    )
    .increment(1);
    histogram!("taskpool_batch_size").record(batch_len as f64);
}

/// 记录当前缓冲区填充量
pub fn record_buffer_fill(len: usize) {
    gauge!("taskpool_buffer_fill").set(len as f64);
}

/// 记录处理器失败
pub fn record_processor_failure(processor: &str) {
    counter!(
        "taskpool_processor_failures_total",
        "processor" => processor.to_string()
    )
    .increment(1);
}

/// 记录单批处理耗时
pub fn record_batch_latency_ms(latency_ms: f64) {
    histogram!("taskpool_batch_latency_ms").record(latency_ms);
}

/// 批次指标聚合器
///
/// 在内存中聚合指标，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BatchMetricsAggregator {
    /// 已投递批次数
    pub total_batches: u64,

    /// 已投递任务数
    pub total_tasks: u64,

    /// 因缓冲区满而投递的批次数
    pub full_batches: u64,

    /// 批大小统计
    pub batch_size_stats: RunningStats,

    /// 处理耗时统计 (毫秒)
    pub latency_stats: RunningStats,

    /// 各任务类型计数
    pub kind_counts: HashMap<String, u64>,
}

impl BatchMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个已投递批次
    pub fn update<'a, I>(&mut self, reason: FlushReason, kinds: I, latency_ms: f64)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut batch_len = 0u64;
        for kind in kinds {
            batch_len += 1;
            *self.kind_counts.entry(kind.to_string()).or_insert(0) += 1;
        }

        self.total_batches += 1;
        self.total_tasks += batch_len;
        if reason == FlushReason::Full {
            self.full_batches += 1;
        }

        self.batch_size_stats.push(batch_len as f64);
        self.latency_stats.push(latency_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_batches: self.total_batches,
            total_tasks: self.total_tasks,
            partial_batches: self.total_batches - self.full_batches,
            batch_size: StatsSummary::from(&self.batch_size_stats),
            latency_ms: StatsSummary::from(&self.latency_stats),
            kind_counts: self.kind_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_batches: u64,
    pub total_tasks: u64,
    pub partial_batches: u64,
    pub batch_size: StatsSummary,
    pub latency_ms: StatsSummary,
    pub kind_counts: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Batch Metrics Summary ===")?;
        writeln!(f, "Batches: {}", self.total_batches)?;
        writeln!(f, "Tasks delivered: {}", self.total_tasks)?;
        writeln!(f, "Partial batches: {}", self.partial_batches)?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.kind_counts.is_empty() {
            let mut kinds: Vec<_> = self.kind_counts.iter().collect();
            kinds.sort();
            writeln!(f, "Tasks by kind:")?;
            for (kind, count) in kinds {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
