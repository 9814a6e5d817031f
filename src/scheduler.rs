//! The multi-level feedback queue dispatcher.
//!
//! Owns the three ready queues and applies the queueing policy: strict
//! priority between levels, FIFO within a level, demotion on quantum
//! expiry, head re-insertion on preemption. It never touches the clock or
//! the running slot; the engine drives it.

use tracing::debug;

use crate::queue::QueueSet;
use crate::scenario::SchedulerConfig;
use crate::task::{ProcessRuntime, ProcessState};
use crate::types::{Level, Pid, Quantum};

#[derive(Debug, Clone)]
pub struct MlfqScheduler {
    config: SchedulerConfig,
    queues: QueueSet,
}

impl MlfqScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        MlfqScheduler {
            config,
            queues: QueueSet::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn queues(&self) -> &QueueSet {
        &self.queues
    }

    /// Place a new runtime at the tail of Level 0.
    pub fn admit(&mut self, rt: &mut ProcessRuntime) {
        rt.level = Level::TOP;
        rt.state = ProcessState::Ready;
        self.queues.level_mut(Level::TOP).push_back(rt.pid);
    }

    /// Remove and return the head of the highest non-empty level.
    /// `None` means the CPU idles this tick.
    pub fn pick_next(&mut self) -> Option<Pid> {
        self.queues.pop_highest().map(|(_, pid)| pid)
    }

    pub fn quantum_for(&self, level: Level) -> Quantum {
        match level {
            Level::TOP => Quantum::Ticks(self.config.quantum_q0),
            Level::MIDDLE => Quantum::Ticks(self.config.quantum_q1),
            _ => Quantum::Unbounded,
        }
    }

    /// Move a runtime whose quantum expired to the tail of the next level.
    /// The bottom level re-appends to its own tail.
    pub fn demote(&mut self, rt: &mut ProcessRuntime) -> Level {
        let from = rt.level;
        rt.level = from.demoted();
        rt.yield_cpu();
        self.queues.level_mut(rt.level).push_back(rt.pid);
        debug!(pid = rt.pid.0, from = from.raw(), to = rt.level.raw(), "demote");
        rt.level
    }

    /// Append a runtime to the tail of its current level (I/O completion).
    pub fn return_same_level(&mut self, rt: &mut ProcessRuntime) {
        debug_assert_eq!(rt.state, ProcessState::Ready);
        self.queues.level_mut(rt.level).push_back(rt.pid);
    }

    /// Push a preempted runtime back to the head of its own level.
    pub fn preempt(&mut self, rt: &mut ProcessRuntime) {
        rt.yield_cpu();
        self.queues.level_mut(rt.level).push_front(rt.pid);
    }

    /// Whether a runtime running at `level` must give way to a waiting
    /// higher-level runtime. Level 0 is never preempted.
    pub fn should_preempt(&self, level: Level) -> bool {
        let top_waiting = !self.queues.level(Level::TOP).is_empty();
        let middle_waiting = !self.queues.level(Level::MIDDLE).is_empty();
        match level {
            Level::TOP => false,
            Level::MIDDLE => top_waiting,
            _ => top_waiting || middle_waiting,
        }
    }
}
