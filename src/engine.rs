//! Discrete tick-driven simulation engine.
//!
//! This is the core of the simulator. It owns the simulated clock, the
//! runtime table, the blocked set and the single CPU slot, and drives the
//! [`MlfqScheduler`] through one fixed sequence per tick:
//!
//! 1. release runtimes whose I/O finished, then service one tick of I/O;
//! 2. preempt the running runtime if a higher level has work;
//! 3. dispatch when the slot is empty;
//! 4. execute one tick (or idle);
//! 5. apply at most one transition: finish, block, or demote;
//! 6. charge a waiting tick to every queued runtime;
//! 7. advance the clock.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::queue::BlockedSet;
use crate::scenario::Scenario;
use crate::scheduler::MlfqScheduler;
use crate::stats::{MetricsRecorder, MetricsSummary, ProcessMetrics};
use crate::task::{ProcessRuntime, TickOutcome};
use crate::trace::{QueueSnapshot, TimelineEntry, Trace, TraceKind};
use crate::types::{Level, Pid, Tick};

thread_local! {
    static SIM_CLOCK: Cell<Tick> = const { Cell::new(0) };
}

/// The tick currently being simulated on this thread. Read by the log
/// formatter.
pub fn sim_clock() -> Tick {
    SIM_CLOCK.with(|c| c.get())
}

/// Update the clock thread-local. Called by the engine before
/// `info!`/`debug!` calls so the formatter has access.
pub fn set_sim_clock(now: Tick) {
    SIM_CLOCK.with(|c| c.set(now));
}

/// How a simulation run terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitKind {
    /// Every process finished.
    Normal,
    /// The safety tick limit was reached with work left.
    TickLimit { unfinished: usize },
}

impl ExitKind {
    pub fn is_normal(&self) -> bool {
        matches!(self, ExitKind::Normal)
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// True iff every process finished before the tick limit.
    pub completed: bool,
    pub exit_kind: ExitKind,
    /// One entry per simulated tick.
    pub timeline: Vec<TimelineEntry>,
    /// Keyed by process name.
    pub metrics: BTreeMap<String, ProcessMetrics>,
    pub context_switches: u64,
    #[serde(skip)]
    pub trace: Trace,
}

impl SimulationResult {
    /// Ticks simulated, including idle ones.
    pub fn makespan(&self) -> Tick {
        self.timeline.len() as Tick
    }

    /// Timeline rendered with the scheduled process name per tick and `-`
    /// for idle ticks.
    pub fn process_sequence(&self) -> Vec<&str> {
        self.timeline
            .iter()
            .map(|e| e.process.as_deref().unwrap_or("-"))
            .collect()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::compute(self)
    }
}

/// Run a scenario to completion (or to its tick limit).
pub fn simulate(scenario: &Scenario) -> Result<SimulationResult, SimError> {
    Ok(Simulator::new(scenario)?.run())
}

/// The simulator.
///
/// Created from a validated [`Scenario`]; every runtime is admitted to
/// Level 0 at tick 0. Use [`Simulator::run`] for a full run or
/// [`Simulator::step`] to inspect state between ticks.
#[derive(Debug, Clone)]
pub struct Simulator {
    scheduler: MlfqScheduler,
    /// Indexed by `Pid`.
    runtimes: Vec<ProcessRuntime>,
    blocked: BlockedSet,
    running: Option<Pid>,
    clock: Tick,
    max_ticks: Tick,
    record_queues: bool,
    recorder: MetricsRecorder,
    trace: Trace,
}

impl Simulator {
    pub fn new(scenario: &Scenario) -> Result<Self, SimError> {
        scenario.validate()?;
        let order = scenario.admission_order();

        let mut scheduler = MlfqScheduler::new(scenario.config);
        let mut runtimes = order
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let pid = Pid::from_index(i).ok_or_else(|| {
                    SimError::Validation(format!("no PID available for process {:?}", spec.name))
                })?;
                Ok(ProcessRuntime::new(pid, (*spec).clone()))
            })
            .collect::<Result<Vec<_>, SimError>>()?;

        set_sim_clock(0);
        for rt in runtimes.iter_mut() {
            scheduler.admit(rt);
            debug!(
                pid = rt.pid.0,
                name = rt.name(),
                priority = rt.spec.priority,
                "admit"
            );
        }

        Ok(Simulator {
            scheduler,
            runtimes,
            blocked: BlockedSet::new(),
            running: None,
            clock: 0,
            max_ticks: scenario.max_ticks,
            record_queues: scenario.record_queues,
            recorder: MetricsRecorder::new(),
            trace: Trace::new(order),
        })
    }

    /// The next tick to be simulated.
    pub fn clock(&self) -> Tick {
        self.clock
    }

    /// The runtime occupying the CPU slot between ticks, if any.
    pub fn running(&self) -> Option<&ProcessRuntime> {
        self.running.map(|pid| &self.runtimes[pid.index()])
    }

    pub fn scheduler(&self) -> &MlfqScheduler {
        &self.scheduler
    }

    pub fn blocked(&self) -> &BlockedSet {
        &self.blocked
    }

    pub fn runtime(&self, pid: Pid) -> Option<&ProcessRuntime> {
        self.runtimes.get(pid.index())
    }

    /// Runtimes in PID (admission) order.
    pub fn runtimes(&self) -> &[ProcessRuntime] {
        &self.runtimes
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn all_finished(&self) -> bool {
        self.runtimes.iter().all(ProcessRuntime::is_finished)
    }

    /// Simulate one tick.
    pub fn step(&mut self) {
        let now = self.clock;
        set_sim_clock(now);

        self.service_io(now);
        self.check_preemption(now);
        if self.running.is_none() {
            self.dispatch(now);
        }
        debug_assert!(
            self.preemption_invariant_holds(),
            "higher level non-empty while a lower level holds the CPU"
        );

        let executed = self.execute(now);
        if let Some(pid) = executed {
            self.apply_transition(now, pid);
        }
        self.accrue_waiting(executed);

        if self.record_queues {
            self.snapshot(now);
        }
        self.clock += 1;
    }

    /// Run until every process finishes or the tick limit is reached.
    pub fn run(mut self) -> SimulationResult {
        while !self.all_finished() {
            if self.clock >= self.max_ticks {
                break;
            }
            self.step();
        }
        self.finish_run()
    }

    fn service_io(&mut self, now: Tick) {
        for pid in self.blocked.service(&mut self.runtimes) {
            let rt = &mut self.runtimes[pid.index()];
            rt.unblock();
            self.scheduler.return_same_level(rt);
            self.trace.record(
                now,
                TraceKind::Unblocked {
                    pid,
                    level: rt.level,
                },
            );
            info!(pid = pid.0, name = rt.name(), level = rt.level.raw(), "UNBLOCKED");
        }
    }

    fn check_preemption(&mut self, now: Tick) {
        let Some(pid) = self.running else {
            return;
        };
        let rt = &mut self.runtimes[pid.index()];
        if !self.scheduler.should_preempt(rt.level) {
            return;
        }
        self.scheduler.preempt(rt);
        self.running = None;
        self.trace.record(
            now,
            TraceKind::Preempted {
                pid,
                level: rt.level,
            },
        );
        info!(pid = pid.0, name = rt.name(), level = rt.level.raw(), "PREEMPTED");
    }

    fn dispatch(&mut self, now: Tick) {
        let Some(pid) = self.scheduler.pick_next() else {
            return;
        };
        let rt = &mut self.runtimes[pid.index()];
        let quantum = self.scheduler.quantum_for(rt.level);
        rt.dispatch(now, quantum);
        self.recorder.record_dispatch();
        self.running = Some(pid);
        self.trace.record(
            now,
            TraceKind::Dispatched {
                pid,
                level: rt.level,
                quantum,
            },
        );
        info!(
            pid = pid.0,
            name = rt.name(),
            level = rt.level.raw(),
            quantum = %quantum,
            "DISPATCH"
        );
    }

    fn execute(&mut self, now: Tick) -> Option<Pid> {
        let Some(pid) = self.running else {
            self.trace.record(now, TraceKind::Idle);
            debug!("IDLE");
            return None;
        };
        let rt = &mut self.runtimes[pid.index()];
        rt.execute_tick();
        self.trace.record(
            now,
            TraceKind::Ran {
                pid,
                level: rt.level,
            },
        );
        debug!(
            pid = pid.0,
            level = rt.level.raw(),
            remaining = rt.remaining_total,
            "tick"
        );
        Some(pid)
    }

    fn apply_transition(&mut self, now: Tick, pid: Pid) {
        let rt = &mut self.runtimes[pid.index()];
        match rt.outcome() {
            TickOutcome::Finished => {
                rt.finish(now + 1);
                self.running = None;
                self.trace.record(now, TraceKind::Finished { pid });
                info!(pid = pid.0, name = rt.name(), end = now + 1, "FINISHED");
            }
            TickOutcome::Blocked => {
                rt.block();
                self.blocked.insert(pid);
                self.running = None;
                self.trace.record(
                    now,
                    TraceKind::Blocked {
                        pid,
                        level: rt.level,
                        io_ticks: rt.remaining_io,
                    },
                );
                info!(
                    pid = pid.0,
                    name = rt.name(),
                    level = rt.level.raw(),
                    io = rt.remaining_io,
                    "BLOCKED"
                );
            }
            TickOutcome::QuantumExpired => {
                let from = rt.level;
                let to = self.scheduler.demote(rt);
                self.running = None;
                self.trace.record(now, TraceKind::Demoted { pid, from, to });
                info!(
                    pid = pid.0,
                    name = rt.name(),
                    from = from.raw(),
                    to = to.raw(),
                    "DEMOTED"
                );
            }
            TickOutcome::Continue => {}
        }
    }

    fn accrue_waiting(&mut self, executed: Option<Pid>) {
        for pid in self.scheduler.queues().iter() {
            if Some(pid) != executed {
                self.runtimes[pid.index()].waiting_ticks += 1;
            }
        }
    }

    fn snapshot(&mut self, now: Tick) {
        let queues = self.scheduler.queues();
        let snapshot = QueueSnapshot {
            time: now,
            levels: Level::ALL.map(|level| queues.level(level).ordered_pids()),
            blocked: self.blocked.ordered_pids(),
            running: self.running,
        };
        self.trace.record_snapshot(snapshot);
    }

    /// A waiting runtime at level `n` implies the CPU holds a runtime at
    /// level `n` or above.
    fn preemption_invariant_holds(&self) -> bool {
        let queues = self.scheduler.queues();
        let highest_waiting = Level::ALL
            .into_iter()
            .find(|&level| !queues.level(level).is_empty());
        match (highest_waiting, self.running()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(waiting), Some(rt)) => rt.level <= waiting,
        }
    }

    fn finish_run(mut self) -> SimulationResult {
        set_sim_clock(self.clock);
        let end = self.clock;
        let unfinished = self.runtimes.iter().filter(|rt| !rt.is_finished()).count();

        let exit_kind = if unfinished == 0 {
            ExitKind::Normal
        } else {
            self.trace.record(end, TraceKind::TickLimit { unfinished });
            warn!(
                max_ticks = self.max_ticks,
                unfinished, "tick limit reached before all processes finished"
            );
            ExitKind::TickLimit { unfinished }
        };
        self.trace.set_exit_kind(exit_kind.clone());

        let metrics = self
            .runtimes
            .iter()
            .map(|rt| (rt.name().to_string(), ProcessMetrics::from_runtime(rt, end)))
            .collect();

        SimulationResult {
            completed: exit_kind.is_normal(),
            exit_kind,
            timeline: self.trace.timeline(),
            metrics,
            context_switches: self.recorder.context_switches(),
            trace: self.trace,
        }
    }
}
