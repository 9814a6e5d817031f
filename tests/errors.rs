//! Tests for input rejection and tick-limit reporting.

mod common;

use mlfq_simulator::*;

#[test]
fn test_quantum_out_of_range_rejected_before_any_tick() {
    common::setup_test();
    for (q0, q1) in [(0, 15), (11, 15), (5, 10), (5, 21)] {
        let err = Scenario::builder()
            .quanta(q0, q1)
            .add_process("P", 1, 1, 1, 0)
            .build()
            .unwrap_err();
        assert!(err.is_config(), "q0={q0} q1={q1}: {err}");
    }

    // Public fields can bypass the builder; the simulator checks again.
    let mut scenario = Scenario::builder()
        .add_process("P", 1, 1, 1, 0)
        .build()
        .unwrap();
    scenario.config.quantum_q1 = 25;
    let err = Simulator::new(&scenario).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("quantum_q1"), "{err}");
    assert!(simulate(&scenario).is_err());
}

#[test]
fn test_quantum_bounds_inclusive() {
    common::setup_test();
    for (q0, q1) in [(1, 11), (10, 20)] {
        let scenario = Scenario::builder()
            .quanta(q0, q1)
            .add_process("P", 0, 0, 30, 0)
            .build()
            .unwrap();
        assert!(common::run(&scenario).completed);
    }
}

#[test]
fn test_invalid_processes_rejected() {
    common::setup_test();
    let cases = [
        Scenario::builder().build(),
        Scenario::builder().add_process("", 1, 1, 1, 0).build(),
        Scenario::builder().add_process("P", 1, 1, 0, 0).build(),
        Scenario::builder()
            .add_process("P", 1, 1, 1, 0)
            .add_process("P", 2, 2, 2, 0)
            .build(),
    ];
    for case in cases {
        let err = case.unwrap_err();
        assert!(err.is_validation(), "{err}");
    }
}

#[test]
fn test_zero_max_ticks_rejected() {
    let err = Scenario::builder()
        .add_process("P", 1, 1, 1, 0)
        .max_ticks(0)
        .build()
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_tick_limit_keeps_partial_results() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(2, 11)
        .add_process("long", 0, 0, 100, 0)
        .add_process("short", 0, 0, 2, 1)
        .max_ticks(10)
        .build()
        .unwrap();
    let result = common::run(&scenario);

    assert!(!result.completed);
    assert_eq!(result.exit_kind, ExitKind::TickLimit { unfinished: 1 });
    assert_eq!(result.trace.exit_kind(), &result.exit_kind);
    assert_eq!(result.timeline.len(), 10);
    assert_eq!(result.makespan(), 10);

    // Partial metrics: the unfinished process reports the final clock.
    assert_eq!(result.metrics["long"].turnaround_time, 10);
    assert_eq!(result.metrics["short"].turnaround_time, 4);
    assert!(matches!(
        result.trace.events().last().map(|e| &e.kind),
        Some(TraceKind::TickLimit { unfinished: 1 })
    ));

    let summary = result.summary();
    assert_eq!(summary.finished, 1);
    assert_eq!(summary.unfinished, 1);
    assert_eq!(summary.turnaround.count, 1);
}

#[test]
fn test_tick_limit_before_first_dispatch() {
    common::setup_test();
    let scenario = Scenario::builder()
        .quanta(1, 11)
        .add_process("a", 0, 0, 5, 0)
        .add_process("b", 0, 0, 5, 1)
        .max_ticks(1)
        .build()
        .unwrap();
    let result = common::run(&scenario);
    assert_eq!(result.exit_kind, ExitKind::TickLimit { unfinished: 2 });
    // Never dispatched: response reported as 0.
    assert_eq!(result.metrics["b"].response_time, 0);
    assert_eq!(result.metrics["b"].waiting_time, 1);
    assert_eq!(result.context_switches, 0);
}

#[test]
fn test_error_display_and_source() {
    let err = SimError::Config("quantum_q0 must be within 1..=10, got 0".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: quantum_q0 must be within 1..=10, got 0"
    );

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = SimError::from(io);
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().starts_with("I/O error"));
}
