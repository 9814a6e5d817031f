//! mlfq_simulator - Deterministic tick-driven simulator of a three-level
//! multi-level feedback queue scheduler.
//!
//! A fixed set of synthetic processes, each alternating CPU bursts with
//! blocking I/O, is dispatched onto a single simulated CPU until every
//! process finishes or a safety tick limit is reached.
//!
//! # Architecture
//!
//! - **Engine**: tick loop owning the clock, the CPU slot and the blocked set
//! - **Scheduler**: three ready queues (round-robin, round-robin, FCFS) with
//!   demotion on quantum expiry and head re-insertion on preemption
//! - **Tasks**: per-process state machine (Ready, Running, Blocked, Finished)
//! - **Trace**: event log from which the timeline and statistics derive
//! - **Loader**: JSON and text-table scenario input
//!
//! # Usage
//!
//! ```rust
//! use mlfq_simulator::*;
//!
//! let scenario = Scenario::builder()
//!     .quanta(3, 15)
//!     .add_process("P", 0, 0, 7, 0)
//!     .build()
//!     .unwrap();
//!
//! let result = simulate(&scenario).unwrap();
//! assert!(result.completed);
//! assert_eq!(result.metrics["P"].turnaround_time, 7);
//! assert_eq!(result.context_switches, 1);
//! ```

pub mod engine;
pub mod error;
pub mod fmt;
pub mod loader;
pub mod queue;
pub mod scenario;
pub mod scheduler;
pub mod stats;
pub mod task;
pub mod trace;
pub mod types;
pub mod workloads;

// Re-export the main public types for convenience.
pub use engine::{set_sim_clock, sim_clock, simulate, ExitKind, SimulationResult, Simulator};
pub use error::SimError;
pub use fmt::{FmtTick, SimFormat};
pub use loader::{load_path, Overrides};
pub use queue::{BlockedSet, LevelQueue, QueueSet};
pub use scenario::{
    Scenario, ScenarioBuilder, SchedulerConfig, DEFAULT_MAX_TICKS, DEFAULT_QUANTUM_Q0,
    DEFAULT_QUANTUM_Q1, MAX_PROCESSES, QUANTUM_Q0_RANGE, QUANTUM_Q1_RANGE,
};
pub use scheduler::MlfqScheduler;
pub use stats::{DistributionStats, MetricsRecorder, MetricsSummary, ProcessMetrics};
pub use task::{ProcessRuntime, ProcessSpec, ProcessState, TickOutcome};
pub use trace::{QueueSnapshot, TimelineEntry, Trace, TraceEvent, TraceKind, TraceSummary};
pub use types::{Level, Pid, Quantum, Tick, NR_LEVELS};
