//! Scenario definition and builder API.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::SimError;
use crate::task::ProcessSpec;
use crate::types::Tick;

/// Allowed quantum for Level 0.
pub const QUANTUM_Q0_RANGE: RangeInclusive<Tick> = 1..=10;
/// Allowed quantum for Level 1.
pub const QUANTUM_Q1_RANGE: RangeInclusive<Tick> = 11..=20;

pub const DEFAULT_QUANTUM_Q0: Tick = 5;
pub const DEFAULT_QUANTUM_Q1: Tick = 15;

/// Default safety limit on the number of simulated ticks.
pub const DEFAULT_MAX_TICKS: Tick = 10_000;

/// Upper bound on the number of processes: every one needs a `u32` PID.
pub const MAX_PROCESSES: usize = u32::MAX as usize;

/// Quanta for the two round-robin levels. Level 2 is FCFS and has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerConfig {
    pub quantum_q0: Tick,
    pub quantum_q1: Tick,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            quantum_q0: DEFAULT_QUANTUM_Q0,
            quantum_q1: DEFAULT_QUANTUM_Q1,
        }
    }
}

impl SchedulerConfig {
    pub fn new(quantum_q0: Tick, quantum_q1: Tick) -> Self {
        SchedulerConfig {
            quantum_q0,
            quantum_q1,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !QUANTUM_Q0_RANGE.contains(&self.quantum_q0) {
            return Err(SimError::Config(format!(
                "quantum_q0 must be within {}..={}, got {}",
                QUANTUM_Q0_RANGE.start(),
                QUANTUM_Q0_RANGE.end(),
                self.quantum_q0
            )));
        }
        if !QUANTUM_Q1_RANGE.contains(&self.quantum_q1) {
            return Err(SimError::Config(format!(
                "quantum_q1 must be within {}..={}, got {}",
                QUANTUM_Q1_RANGE.start(),
                QUANTUM_Q1_RANGE.end(),
                self.quantum_q1
            )));
        }
        Ok(())
    }
}

/// A complete simulation scenario: scheduler configuration, processes and
/// run options.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SchedulerConfig,
    /// Processes in input order. Admission order is derived from priority.
    pub processes: Vec<ProcessSpec>,
    /// Safety limit. A run that reaches it reports `completed = false`.
    pub max_ticks: Tick,
    /// Record the content of every queue at the end of each tick.
    pub record_queues: bool,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder {
            config: SchedulerConfig::default(),
            processes: Vec::new(),
            max_ticks: DEFAULT_MAX_TICKS,
            record_queues: false,
        }
    }

    /// Check every rule a run relies on. Called by [`ScenarioBuilder::build`]
    /// and again by the simulator, since the fields are public.
    pub fn validate(&self) -> Result<(), SimError> {
        self.config.validate()?;
        if self.processes.is_empty() {
            return Err(SimError::Validation(
                "scenario must have at least one process".into(),
            ));
        }
        if self.processes.len() > MAX_PROCESSES {
            return Err(SimError::Validation(format!(
                "too many processes: {} (at most {MAX_PROCESSES})",
                self.processes.len()
            )));
        }
        let mut names = HashSet::new();
        for spec in &self.processes {
            spec.validate()?;
            if !names.insert(spec.name.as_str()) {
                return Err(SimError::Validation(format!(
                    "duplicate process name {:?}",
                    spec.name
                )));
            }
        }
        if self.max_ticks == 0 {
            return Err(SimError::Config("max_ticks must be > 0".into()));
        }
        Ok(())
    }

    /// Process specs sorted into admission order: ascending priority, ties
    /// kept in input order.
    pub fn admission_order(&self) -> Vec<&ProcessSpec> {
        let mut ordered: Vec<&ProcessSpec> = self.processes.iter().collect();
        // Stable sort keeps input order among equal priorities.
        ordered.sort_by_key(|spec| spec.priority);
        ordered
    }
}

/// Builder for constructing scenarios.
pub struct ScenarioBuilder {
    config: SchedulerConfig,
    processes: Vec<ProcessSpec>,
    max_ticks: Tick,
    record_queues: bool,
}

impl ScenarioBuilder {
    /// Set both round-robin quanta.
    pub fn quanta(mut self, quantum_q0: Tick, quantum_q1: Tick) -> Self {
        self.config = SchedulerConfig::new(quantum_q0, quantum_q1);
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// The quanta set so far.
    pub fn current_config(&self) -> SchedulerConfig {
        self.config
    }

    /// Add a process with a full spec.
    pub fn process(mut self, spec: ProcessSpec) -> Self {
        self.processes.push(spec);
        self
    }

    /// Add several processes in input order.
    pub fn processes(mut self, specs: impl IntoIterator<Item = ProcessSpec>) -> Self {
        self.processes.extend(specs);
        self
    }

    /// Convenience: add a process from its raw fields.
    pub fn add_process(
        self,
        name: &str,
        cpu_burst: Tick,
        io_time: Tick,
        total_cpu_time: Tick,
        priority: u32,
    ) -> Self {
        self.process(ProcessSpec::new(
            name,
            cpu_burst,
            io_time,
            total_cpu_time,
            priority,
        ))
    }

    /// Set the safety tick limit.
    pub fn max_ticks(mut self, ticks: Tick) -> Self {
        self.max_ticks = ticks;
        self
    }

    /// Record per-tick queue snapshots in the trace.
    pub fn record_queues(mut self, enabled: bool) -> Self {
        self.record_queues = enabled;
        self
    }

    /// Build and validate the scenario.
    pub fn build(self) -> Result<Scenario, SimError> {
        let scenario = Scenario {
            config: self.config,
            processes: self.processes,
            max_ticks: self.max_ticks,
            record_queues: self.record_queues,
        };
        scenario.validate()?;
        Ok(scenario)
    }
}
