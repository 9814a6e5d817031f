//! Process model for the simulator.
//!
//! A [`ProcessSpec`] is the immutable description supplied by the caller; a
//! [`ProcessRuntime`] is the mutable per-run state derived from it. The
//! runtime owns the state machine: the engine executes a tick and then asks
//! the runtime which transition (if any) that tick triggered.

use serde::Serialize;

use crate::error::SimError;
use crate::types::{Level, Pid, Quantum, Tick};

/// Definition of a synthetic process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSpec {
    pub name: String,
    /// CPU ticks consumed before each I/O request. Zero means the process
    /// has no burst boundary and never requests I/O.
    pub cpu_burst: Tick,
    /// Ticks spent blocked per I/O request. Zero means the process never
    /// blocks.
    pub io_time: Tick,
    /// Total CPU ticks needed to finish.
    pub total_cpu_time: Tick,
    /// Admission priority: lower values enter Level 0 first.
    pub priority: u32,
}

impl ProcessSpec {
    pub fn new(
        name: &str,
        cpu_burst: Tick,
        io_time: Tick,
        total_cpu_time: Tick,
        priority: u32,
    ) -> Self {
        ProcessSpec {
            name: name.to_string(),
            cpu_burst,
            io_time,
            total_cpu_time,
            priority,
        }
    }

    /// Check the per-process rules. Cross-process rules (unique names) are
    /// checked by the scenario builder.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.name.trim().is_empty() {
            return Err(SimError::Validation("process name must not be empty".into()));
        }
        if self.total_cpu_time == 0 {
            return Err(SimError::Validation(format!(
                "{}: total_cpu_time must be > 0",
                self.name
            )));
        }
        Ok(())
    }

    /// Whether this process ever leaves the CPU for I/O.
    pub fn does_io(&self) -> bool {
        self.io_time > 0 && self.cpu_burst > 0
    }
}

/// The state a simulated process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    /// Waiting in one of the feedback queues.
    Ready,
    /// Occupying the CPU slot.
    Running,
    /// Performing simulated I/O.
    Blocked,
    /// All CPU work done. Terminal.
    Finished,
}

/// What happened to a runtime at the end of a tick it executed.
///
/// Checked in declaration order; at most one fires per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Finished,
    /// Burst exhausted; leaves the CPU for I/O at its current level.
    Blocked,
    /// Quantum exhausted; the scheduler demotes it.
    QuantumExpired,
    /// Keeps the CPU next tick.
    Continue,
}

/// A simulated process at runtime.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    pub pid: Pid,
    pub spec: ProcessSpec,
    pub level: Level,
    pub state: ProcessState,
    /// CPU ticks left until the process finishes.
    pub remaining_total: Tick,
    /// CPU ticks left before the next I/O request.
    pub remaining_burst: Tick,
    /// I/O ticks not yet serviced (only meaningful while Blocked).
    pub remaining_io: Tick,
    /// Assigned on dispatch, dropped when the runtime leaves the CPU.
    pub quantum_left: Option<Quantum>,
    /// Ticks spent Ready in a queue.
    pub waiting_ticks: Tick,
    pub first_dispatch_time: Option<Tick>,
    pub finish_time: Option<Tick>,
}

impl ProcessRuntime {
    pub fn new(pid: Pid, spec: ProcessSpec) -> Self {
        ProcessRuntime {
            pid,
            level: Level::TOP,
            state: ProcessState::Ready,
            remaining_total: spec.total_cpu_time,
            remaining_burst: spec.cpu_burst,
            remaining_io: 0,
            quantum_left: None,
            waiting_ticks: 0,
            first_dispatch_time: None,
            finish_time: None,
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_finished(&self) -> bool {
        self.state == ProcessState::Finished
    }

    /// Take the CPU slot with a fresh quantum.
    pub fn dispatch(&mut self, now: Tick, quantum: Quantum) {
        debug_assert_eq!(self.state, ProcessState::Ready);
        self.state = ProcessState::Running;
        self.quantum_left = Some(quantum);
        self.first_dispatch_time.get_or_insert(now);
    }

    /// Consume one CPU tick.
    pub fn execute_tick(&mut self) {
        debug_assert_eq!(self.state, ProcessState::Running);
        debug_assert!(self.remaining_total > 0);
        self.remaining_total -= 1;
        self.remaining_burst = self.remaining_burst.saturating_sub(1);
        if let Some(q) = self.quantum_left.as_mut() {
            q.consume();
        }
    }

    /// Decide the transition triggered by the tick just executed.
    pub fn outcome(&self) -> TickOutcome {
        if self.remaining_total == 0 {
            TickOutcome::Finished
        } else if self.spec.does_io() && self.remaining_burst == 0 {
            TickOutcome::Blocked
        } else if self.quantum_left.is_some_and(Quantum::is_expired) {
            TickOutcome::QuantumExpired
        } else {
            TickOutcome::Continue
        }
    }

    /// Running -> Finished. `end` is the first tick after the last one executed.
    pub fn finish(&mut self, end: Tick) {
        self.state = ProcessState::Finished;
        self.quantum_left = None;
        self.finish_time = Some(end);
    }

    /// Running -> Blocked. The level is kept for the return trip.
    pub fn block(&mut self) {
        self.state = ProcessState::Blocked;
        self.quantum_left = None;
        self.remaining_io = self.spec.io_time;
    }

    /// Blocked -> Ready with a fresh burst.
    pub fn unblock(&mut self) {
        debug_assert_eq!(self.state, ProcessState::Blocked);
        self.state = ProcessState::Ready;
        self.remaining_io = 0;
        self.remaining_burst = self.spec.cpu_burst;
    }

    /// Running -> Ready, either preempted or after quantum expiry. Any
    /// unused quantum is discarded.
    pub fn yield_cpu(&mut self) {
        self.state = ProcessState::Ready;
        self.quantum_left = None;
    }
}
