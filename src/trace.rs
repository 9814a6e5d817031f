//! Trace event recording for the simulator.
//!
//! Every scheduling action (dispatch, executed tick, idle tick, preemption,
//! demotion, I/O block and release, completion) is recorded as a
//! `TraceEvent` stamped with the simulated tick. The per-tick timeline is
//! derived from the `Ran`/`Idle` events.

use serde::Serialize;

use crate::engine::ExitKind;
use crate::fmt::FmtTick;
use crate::task::ProcessSpec;
use crate::types::{Level, Pid, Quantum, Tick, NR_LEVELS};

/// Summary counts from a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummary {
    /// Total number of trace events recorded.
    pub total_events: usize,
    /// Ticks on which some runtime executed.
    pub busy_ticks: usize,
    /// Ticks on which the CPU idled.
    pub idle_ticks: usize,
    pub dispatches: usize,
    pub preemptions: usize,
    pub demotions: usize,
    /// I/O requests (transitions to Blocked).
    pub blocks: usize,
    pub unblocks: usize,
    pub completions: usize,
}

impl std::fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trace Summary:")?;
        writeln!(f, "  total_events: {}", self.total_events)?;
        writeln!(f, "  busy_ticks:   {}", self.busy_ticks)?;
        writeln!(f, "  idle_ticks:   {}", self.idle_ticks)?;
        writeln!(f, "  dispatches:   {}", self.dispatches)?;
        writeln!(f, "  preemptions:  {}", self.preemptions)?;
        writeln!(f, "  demotions:    {}", self.demotions)?;
        writeln!(f, "  blocks:       {}", self.blocks)?;
        writeln!(f, "  unblocks:     {}", self.unblocks)?;
        writeln!(f, "  completions:  {}", self.completions)
    }
}

/// A single trace event produced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Simulated tick during which this event occurred.
    pub time: Tick,
    pub kind: TraceKind,
}

/// The type of scheduling event recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    /// A runtime was loaded onto the CPU with a fresh quantum.
    Dispatched {
        pid: Pid,
        level: Level,
        quantum: Quantum,
    },
    /// A runtime executed one CPU tick.
    Ran { pid: Pid, level: Level },
    /// No runtime was ready; the CPU idled for one tick.
    Idle,
    /// A runtime was pushed back to the head of its level by a
    /// higher-level arrival.
    Preempted { pid: Pid, level: Level },
    /// A runtime exhausted its quantum.
    Demoted { pid: Pid, from: Level, to: Level },
    /// A runtime exhausted its burst and started I/O.
    Blocked {
        pid: Pid,
        level: Level,
        io_ticks: Tick,
    },
    /// A runtime finished I/O and re-entered its level.
    Unblocked { pid: Pid, level: Level },
    /// A runtime completed all its CPU work.
    Finished { pid: Pid },
    /// The safety limit stopped the run with work left.
    TickLimit { unfinished: usize },
}

/// Content of every queue at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub time: Tick,
    pub levels: [Vec<Pid>; NR_LEVELS],
    pub blocked: Vec<Pid>,
    pub running: Option<Pid>,
}

/// One tick of CPU activity, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub time: Tick,
    /// `None` for an idle tick.
    pub process: Option<String>,
    pub level: Option<Level>,
}

impl TimelineEntry {
    pub fn is_idle(&self) -> bool {
        self.process.is_none()
    }
}

impl std::fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.process, self.level) {
            (Some(name), Some(level)) => write!(f, "{:>5}  {name} (L{level})", self.time),
            (Some(name), None) => write!(f, "{:>5}  {name}", self.time),
            _ => write!(f, "{:>5}  IDLE", self.time),
        }
    }
}

/// A complete simulation trace, containing all events in chronological order.
#[derive(Debug, Clone)]
pub struct Trace {
    events: Vec<TraceEvent>,
    snapshots: Vec<QueueSnapshot>,
    /// Indexed by `Pid`.
    task_names: Vec<String>,
    exit_kind: ExitKind,
}

impl Trace {
    /// `specs` must be in admission (PID) order.
    pub(crate) fn new<'a>(specs: impl IntoIterator<Item = &'a ProcessSpec>) -> Self {
        Self {
            events: Vec::new(),
            snapshots: Vec::new(),
            task_names: specs.into_iter().map(|s| s.name.clone()).collect(),
            exit_kind: ExitKind::Normal,
        }
    }

    /// Resolve a PID to a process name, or `"???"` if unknown.
    pub fn task_name(&self, pid: Pid) -> &str {
        self.task_names
            .get(pid.index())
            .map(String::as_str)
            .unwrap_or("???")
    }

    /// Look up the PID assigned to a process name.
    pub fn pid_of(&self, name: &str) -> Option<Pid> {
        self.task_names
            .iter()
            .position(|n| n == name)
            .and_then(Pid::from_index)
    }

    pub(crate) fn set_exit_kind(&mut self, kind: ExitKind) {
        self.exit_kind = kind;
    }

    /// How the simulation terminated.
    pub fn exit_kind(&self) -> &ExitKind {
        &self.exit_kind
    }

    pub(crate) fn record(&mut self, time: Tick, kind: TraceKind) {
        self.events.push(TraceEvent { time, kind });
    }

    pub(crate) fn record_snapshot(&mut self, snapshot: QueueSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Get all events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Per-tick queue snapshots. Empty unless the scenario enabled
    /// `record_queues`.
    pub fn snapshots(&self) -> &[QueueSnapshot] {
        &self.snapshots
    }

    /// One entry per simulated tick, in time order.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Ran { pid, level } => Some(TimelineEntry {
                    time: e.time,
                    process: Some(self.task_name(pid).to_string()),
                    level: Some(level),
                }),
                TraceKind::Idle => Some(TimelineEntry {
                    time: e.time,
                    process: None,
                    level: None,
                }),
                _ => None,
            })
            .collect()
    }

    /// Compact CPU line: the first character of the running process's name
    /// for each tick, `-` for idle ticks.
    pub fn gantt(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Ran { pid, .. } => {
                    Some(self.task_name(pid).chars().next().unwrap_or('?'))
                }
                TraceKind::Idle => Some('-'),
                _ => None,
            })
            .collect()
    }

    /// Number of ticks a runtime executed.
    pub fn run_ticks(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Ran { pid: p, .. } if p == pid))
            .count()
    }

    /// Number of ticks executed at a level, over all runtimes.
    pub fn level_ticks(&self, level: Level) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Ran { level: l, .. } if l == level))
            .count()
    }

    /// Lengths of a runtime's uninterrupted stints on the CPU.
    pub fn run_lengths(&self, pid: Pid) -> Vec<Tick> {
        let mut lengths = Vec::new();
        let mut current: Tick = 0;
        for event in &self.events {
            match event.kind {
                TraceKind::Ran { pid: p, .. } if p == pid => current += 1,
                TraceKind::Ran { .. } | TraceKind::Idle if current > 0 => {
                    lengths.push(current);
                    current = 0;
                }
                _ => {}
            }
        }
        if current > 0 {
            lengths.push(current);
        }
        lengths
    }

    /// Count the number of times a runtime was dispatched.
    pub fn dispatch_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Dispatched { pid: p, .. } if p == pid))
            .count()
    }

    pub fn preempt_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Preempted { pid: p, .. } if p == pid))
            .count()
    }

    pub fn demote_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Demoted { pid: p, .. } if p == pid))
            .count()
    }

    /// Count the number of I/O requests a runtime made.
    pub fn block_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Blocked { pid: p, .. } if p == pid))
            .count()
    }

    /// Count the number of idle ticks.
    pub fn idle_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Idle))
            .count()
    }

    /// Tick at which a runtime completed, if it did.
    pub fn finish_time(&self, pid: Pid) -> Option<Tick> {
        self.events.iter().find_map(|e| match e.kind {
            TraceKind::Finished { pid: p } if p == pid => Some(e.time + 1),
            _ => None,
        })
    }

    /// PIDs of every runtime that completed, in completion order.
    pub fn finished_pids(&self) -> Vec<Pid> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Finished { pid } => Some(pid),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> TraceSummary {
        let mut summary = TraceSummary {
            total_events: self.events.len(),
            ..TraceSummary::default()
        };
        for event in &self.events {
            match event.kind {
                TraceKind::Dispatched { .. } => summary.dispatches += 1,
                TraceKind::Ran { .. } => summary.busy_ticks += 1,
                TraceKind::Idle => summary.idle_ticks += 1,
                TraceKind::Preempted { .. } => summary.preemptions += 1,
                TraceKind::Demoted { .. } => summary.demotions += 1,
                TraceKind::Blocked { .. } => summary.blocks += 1,
                TraceKind::Unblocked { .. } => summary.unblocks += 1,
                TraceKind::Finished { .. } => summary.completions += 1,
                TraceKind::TickLimit { .. } => {}
            }
        }
        summary
    }

    /// Pretty-print the trace for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            let desc = match event.kind {
                TraceKind::Dispatched {
                    pid,
                    level,
                    quantum,
                } => format!(
                    "DISPATCH  {} pid={} L{} quantum={}",
                    self.task_name(pid),
                    pid,
                    level,
                    quantum
                ),
                TraceKind::Ran { pid, level } => {
                    format!("RUN       {} pid={} L{}", self.task_name(pid), pid, level)
                }
                TraceKind::Idle => "IDLE".to_string(),
                TraceKind::Preempted { pid, level } => {
                    format!("PREEMPT   {} pid={} L{}", self.task_name(pid), pid, level)
                }
                TraceKind::Demoted { pid, from, to } => format!(
                    "DEMOTE    {} pid={} L{} -> L{}",
                    self.task_name(pid),
                    pid,
                    from,
                    to
                ),
                TraceKind::Blocked {
                    pid,
                    level,
                    io_ticks,
                } => format!(
                    "BLOCK     {} pid={} L{} io={}",
                    self.task_name(pid),
                    pid,
                    level,
                    io_ticks
                ),
                TraceKind::Unblocked { pid, level } => {
                    format!("UNBLOCK   {} pid={} L{}", self.task_name(pid), pid, level)
                }
                TraceKind::Finished { pid } => {
                    format!("FINISH    {} pid={}", self.task_name(pid), pid)
                }
                TraceKind::TickLimit { unfinished } => {
                    format!("TICK_LIMIT unfinished={unfinished}")
                }
            };
            eprintln!("[{}] {}", FmtTick(event.time), desc);
        }
    }
}
