//! Plain-text tables for the CLI.

use std::fmt::Write;

use mlfq_simulator::{Pid, SimulationResult, Trace};

pub fn timeline(result: &SimulationResult) -> String {
    let mut out = String::from(" tick  process\n");
    for entry in &result.timeline {
        let _ = writeln!(out, "{entry}");
    }
    out
}

pub fn metrics_table(result: &SimulationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>9} {:>11}",
        "process", "waiting", "response", "turnaround"
    );
    for (name, m) in &result.metrics {
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>9} {:>11}",
            name, m.waiting_time, m.response_time, m.turnaround_time
        );
    }
    out
}

fn names(trace: &Trace, pids: &[Pid]) -> String {
    if pids.is_empty() {
        return "-".to_string();
    }
    pids.iter()
        .map(|&pid| trace.task_name(pid))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn queues(result: &SimulationResult) -> String {
    let trace = &result.trace;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<10} {:<16} {:<16} {:<16} {:<16}",
        "tick", "running", "L0", "L1", "L2", "blocked"
    );
    for snap in trace.snapshots() {
        let running = snap
            .running
            .map(|pid| trace.task_name(pid).to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>5}  {:<10} {:<16} {:<16} {:<16} {:<16}",
            snap.time,
            running,
            names(trace, &snap.levels[0]),
            names(trace, &snap.levels[1]),
            names(trace, &snap.levels[2]),
            names(trace, &snap.blocked),
        );
    }
    out
}
