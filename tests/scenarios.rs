mod common;

use mlfq_simulator::*;

#[test]
fn test_cpu_bound_demotes_after_level0_quantum() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(3, 15)
        .add_process("P", 0, 0, 7, 0)
        .build()
        .unwrap();
    let result = common::run(&scenario);
    result.trace.dump();

    assert!(result.completed);
    assert_eq!(result.exit_kind, ExitKind::Normal);
    assert_eq!(common::run_levels(&result, Pid(0)), vec![0, 0, 0, 1, 1, 1, 1]);

    let m = result.metrics["P"];
    assert_eq!(m.turnaround_time, 7);
    assert_eq!(m.response_time, 0);
    assert_eq!(m.waiting_time, 0);
    assert_eq!(result.context_switches, 1);
    assert_eq!(result.trace.demote_count(Pid(0)), 1);
}

#[test]
fn test_io_bound_alternates_with_idle() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(5, 15)
        .add_process("P", 2, 3, 5, 0)
        .build()
        .unwrap();
    let result = common::run(&scenario);

    assert!(result.completed);
    assert_eq!(
        result.process_sequence(),
        vec!["P", "P", "-", "-", "-", "P", "P", "-", "-", "-", "P"]
    );
    assert_eq!(result.trace.gantt(), "PP---PP---P");
    assert!(result.timeline.iter().all(|e| e.is_idle() || e.level == Some(Level::TOP)));

    let m = result.metrics["P"];
    assert_eq!(m.turnaround_time, 11);
    assert_eq!(m.waiting_time, 0);
    assert_eq!(result.trace.block_count(Pid(0)), 2);
    assert_eq!(result.context_switches, 2);
}

/// `Low` sinks to Level 1; `High` returns from I/O and takes the CPU on the
/// same tick, and `Low` resumes from the head of Level 1.
#[test]
fn test_io_return_preempts_level1() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(2, 11)
        .add_process("Low", 0, 0, 20, 0)
        .add_process("High", 2, 5, 6, 1)
        .build()
        .unwrap();
    let result = common::run(&scenario);
    result.trace.dump();

    let low = common::pid(&result, "Low");
    let high = common::pid(&result, "High");
    assert!(result.completed);

    // High blocks at the end of tick 3 and is Blocked during ticks 4..=8.
    assert!(result.trace.events().iter().any(|e| e.time == 9
        && e.kind == TraceKind::Unblocked { pid: high, level: Level::TOP }));
    assert_eq!(common::preemptions(&result, low), vec![(9, 1), (16, 1)]);

    assert_eq!(result.timeline[9].process.as_deref(), Some("High"));
    assert_eq!(result.timeline[11].process.as_deref(), Some("Low"));
    assert_eq!(result.timeline[11].level, Some(Level::MIDDLE));
    assert_eq!(result.trace.gantt(), "LLHHLLLLLHHLLLLLHHLLLLLLLL");

    // Preemption never demotes.
    assert_eq!(result.trace.demote_count(low), 1);
    assert!(common::run_levels(&result, low).iter().all(|&l| l <= 1));

    assert_eq!(result.metrics["High"].turnaround_time, 18);
    assert_eq!(result.metrics["High"].response_time, 2);
    assert_eq!(result.metrics["High"].waiting_time, 2);
    assert_eq!(result.metrics["Low"].turnaround_time, 26);
    assert_eq!(result.metrics["Low"].waiting_time, 6);
    assert_eq!(result.context_switches, 6);
}

/// With a long I/O, `Low` is already in the FCFS level when `High` returns.
/// It is preempted there and keeps its place ahead of `Bg`.
#[test]
fn test_io_return_preempts_level2_keeps_position() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(2, 11)
        .add_process("Low", 0, 0, 40, 0)
        .add_process("High", 2, 25, 4, 1)
        .add_process("Bg", 0, 0, 30, 2)
        .record_queues(true)
        .build()
        .unwrap();
    let result = common::run(&scenario);

    let low = common::pid(&result, "Low");
    let high = common::pid(&result, "High");
    let bg = common::pid(&result, "Bg");
    assert!(result.completed);

    assert_eq!(result.timeline[28].process.as_deref(), Some("Low"));
    assert_eq!(result.timeline[28].level, Some(Level::BOTTOM));
    assert_eq!(common::preemptions(&result, low), vec![(29, 2)]);
    assert_eq!(result.timeline[29].process.as_deref(), Some("High"));

    let snap = &result.trace.snapshots()[29];
    assert_eq!(snap.time, 29);
    assert_eq!(snap.running, Some(high));
    assert_eq!(snap.levels[2], vec![low, bg]);

    assert_eq!(result.timeline[31].process.as_deref(), Some("Low"));
    assert_eq!(result.timeline[31].level, Some(Level::BOTTOM));
    assert_eq!(result.trace.demote_count(low), 2);

    assert_eq!(result.metrics["High"].turnaround_time, 31);
    assert_eq!(result.metrics["Low"].turnaround_time, 57);
    assert_eq!(result.metrics["Bg"].turnaround_time, 74);
}

#[test]
fn test_admission_by_priority_then_input_order() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(1, 11)
        .add_process("c", 0, 0, 1, 5)
        .add_process("a", 0, 0, 1, 0)
        .add_process("b", 0, 0, 1, 0)
        .build()
        .unwrap();
    let result = common::run(&scenario);
    assert_eq!(result.process_sequence(), vec!["a", "b", "c"]);
    assert_eq!(result.metrics["a"].response_time, 0);
    assert_eq!(result.metrics["b"].response_time, 1);
    assert_eq!(result.metrics["c"].response_time, 2);
    assert_eq!(result.metrics["c"].waiting_time, 2);
}

#[test]
fn test_level0_round_robin() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(2, 11)
        .add_process("x", 1, 4, 3, 0)
        .add_process("y", 1, 4, 3, 0)
        .build()
        .unwrap();
    let result = common::run(&scenario);

    // One-tick bursts keep both processes at Level 0 for their whole life.
    assert!(result
        .timeline
        .iter()
        .all(|e| e.is_idle() || e.level == Some(Level::TOP)));
    assert_eq!(result.trace.gantt(), "xy---xy---xy");
    assert_eq!(result.metrics["x"].turnaround_time, 11);
    assert_eq!(result.metrics["y"].turnaround_time, 12);
}

#[test]
fn test_json_result_shape() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(5, 15)
        .add_process("P", 2, 3, 5, 0)
        .build()
        .unwrap();
    let result = common::run(&scenario);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["completed"], true);
    assert_eq!(value["exit_kind"]["kind"], "normal");
    assert_eq!(value["context_switches"], 2);
    assert_eq!(value["metrics"]["P"]["turnaround_time"], 11);
    assert_eq!(value["timeline"][0]["process"], "P");
    assert_eq!(value["timeline"][0]["level"], 0);
    assert!(value["timeline"][2]["process"].is_null());
    assert!(value.get("trace").is_none());
}
