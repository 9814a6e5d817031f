#![allow(dead_code)]

use mlfq_simulator::{simulate, Pid, Scenario, SimFormat, SimulationResult, TraceKind};

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .event_format(SimFormat)
        .try_init();
}

/// Run a scenario that is known to be valid.
pub fn run(scenario: &Scenario) -> SimulationResult {
    simulate(scenario).expect("scenario should be valid")
}

/// PID of a process by name.
pub fn pid(result: &SimulationResult, name: &str) -> Pid {
    result
        .trace
        .pid_of(name)
        .unwrap_or_else(|| panic!("no process named {name:?}"))
}

/// Ticks at which `pid` was preempted, with the level it was sent back to.
pub fn preemptions(result: &SimulationResult, pid: Pid) -> Vec<(u64, u8)> {
    result
        .trace
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            TraceKind::Preempted { pid: p, level } if p == pid => Some((e.time, level.raw())),
            _ => None,
        })
        .collect()
}

/// Levels at which `pid` executed, one per tick it ran.
pub fn run_levels(result: &SimulationResult, pid: Pid) -> Vec<u8> {
    result
        .trace
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            TraceKind::Ran { pid: p, level } if p == pid => Some(level.raw()),
            _ => None,
        })
        .collect()
}
