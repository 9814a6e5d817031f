//! Per-process metrics and aggregate statistics for a run.
//!
//! # Metrics Computed
//!
//! - **Per process**: waiting, response and turnaround time
//! - **Distributions**: count/min/max/mean over finished processes
//! - **CPU**: busy and idle ticks, utilization, throughput
//! - **Scheduling activity**: context switches, preemptions, demotions,
//!   I/O requests, ticks executed per level

use serde::Serialize;

use crate::engine::SimulationResult;
use crate::task::ProcessRuntime;
use crate::types::{Level, Tick, NR_LEVELS};

/// Timing metrics for one process. All values are in ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    /// Ticks spent Ready in a queue.
    pub waiting_time: Tick,
    /// First dispatch minus arrival (always 0).
    pub response_time: Tick,
    /// Completion minus arrival.
    pub turnaround_time: Tick,
}

impl ProcessMetrics {
    /// Metrics for a runtime at the end of a run that stopped at `end`.
    ///
    /// A runtime that never ran reports a response time of 0, and one that
    /// never finished reports `end` as its turnaround.
    pub fn from_runtime(rt: &ProcessRuntime, end: Tick) -> Self {
        ProcessMetrics {
            waiting_time: rt.waiting_ticks,
            response_time: rt.first_dispatch_time.unwrap_or(0),
            turnaround_time: rt.finish_time.unwrap_or(end),
        }
    }
}

/// Counts dispatches while the run is in progress.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    dispatches: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&mut self) {
        self.dispatches += 1;
    }

    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    /// Every dispatch after the first replaces whatever last held the CPU.
    pub fn context_switches(&self) -> u64 {
        self.dispatches.saturating_sub(1)
    }
}

/// Summary statistics for a series of tick counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistributionStats {
    /// Number of samples.
    pub count: usize,
    /// Minimum value (or 0 if empty).
    pub min: Tick,
    /// Maximum value (or 0 if empty).
    pub max: Tick,
    pub sum: Tick,
}

impl DistributionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample value.
    pub fn add(&mut self, value: Tick) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Mean value (or 0 if empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl FromIterator<Tick> for DistributionStats {
    fn from_iter<I: IntoIterator<Item = Tick>>(iter: I) -> Self {
        let mut stats = DistributionStats::new();
        for value in iter {
            stats.add(value);
        }
        stats
    }
}

/// Aggregate view of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub finished: usize,
    pub unfinished: usize,
    /// Over finished processes only.
    pub waiting: DistributionStats,
    pub response: DistributionStats,
    pub turnaround: DistributionStats,
    /// Ticks simulated.
    pub makespan: Tick,
    pub busy_ticks: Tick,
    pub idle_ticks: Tick,
    /// Busy ticks as a percentage of the makespan.
    pub cpu_utilization: f64,
    /// Finished processes per tick.
    pub throughput: f64,
    /// Ticks executed at each level.
    pub level_ticks: [Tick; NR_LEVELS],
    pub context_switches: u64,
    pub preemptions: usize,
    pub demotions: usize,
    pub io_requests: usize,
}

impl MetricsSummary {
    pub fn compute(result: &SimulationResult) -> Self {
        let trace = &result.trace;
        let finished: Vec<&str> = trace
            .finished_pids()
            .into_iter()
            .map(|pid| trace.task_name(pid))
            .collect();
        let finished_metrics: Vec<&ProcessMetrics> = result
            .metrics
            .iter()
            .filter(|(name, _)| finished.contains(&name.as_str()))
            .map(|(_, m)| m)
            .collect();

        let makespan = result.makespan();
        let trace_summary = trace.summary();
        let busy_ticks = trace_summary.busy_ticks as Tick;
        let idle_ticks = trace_summary.idle_ticks as Tick;

        let (cpu_utilization, throughput) = if makespan == 0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * busy_ticks as f64 / makespan as f64,
                finished.len() as f64 / makespan as f64,
            )
        };

        MetricsSummary {
            finished: finished.len(),
            unfinished: result.metrics.len() - finished.len(),
            waiting: finished_metrics.iter().map(|m| m.waiting_time).collect(),
            response: finished_metrics.iter().map(|m| m.response_time).collect(),
            turnaround: finished_metrics.iter().map(|m| m.turnaround_time).collect(),
            makespan,
            busy_ticks,
            idle_ticks,
            cpu_utilization,
            throughput,
            level_ticks: Level::ALL.map(|level| trace.level_ticks(level) as Tick),
            context_switches: result.context_switches,
            preemptions: trace_summary.preemptions,
            demotions: trace_summary.demotions,
            io_requests: trace_summary.blocks,
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "processes:        {} finished, {} unfinished",
            self.finished, self.unfinished
        )?;
        for (label, stats) in [
            ("avg waiting", &self.waiting),
            ("avg response", &self.response),
            ("avg turnaround", &self.turnaround),
        ] {
            writeln!(
                f,
                "{:<17} {:.2} (min {}, max {})",
                format!("{label}:"),
                stats.mean(),
                stats.min,
                stats.max
            )?;
        }
        writeln!(f, "makespan:         {}", self.makespan)?;
        writeln!(
            f,
            "cpu utilization:  {:.1}% ({} busy, {} idle)",
            self.cpu_utilization, self.busy_ticks, self.idle_ticks
        )?;
        writeln!(f, "throughput:       {:.4} proc/tick", self.throughput)?;
        writeln!(
            f,
            "level ticks:      L0={} L1={} L2={}",
            self.level_ticks[0], self.level_ticks[1], self.level_ticks[2]
        )?;
        writeln!(f, "context switches: {}", self.context_switches)?;
        write!(
            f,
            "preemptions:      {}\ndemotions:        {}\nio requests:      {}",
            self.preemptions, self.demotions, self.io_requests
        )
    }
}
