//! Workload builder helpers for common process patterns.
//!
//! Each function returns a [`ProcessSpec`] for a well-known archetype.
//! These are composed into scenarios for tests and benchmarks.

use crate::task::ProcessSpec;
use crate::types::Tick;

/// Pure CPU-bound process: never requests I/O.
///
/// Sinks to Level 2 once it has used a Level 0 and a Level 1 quantum.
pub fn cpu_bound(name: &str, total: Tick, priority: u32) -> ProcessSpec {
    ProcessSpec::new(name, 0, 0, total, priority)
}

/// I/O-bound process: short bursts separated by I/O waits.
///
/// With `burst` below the Level 0 quantum it never leaves Level 0.
pub fn io_bound(name: &str, burst: Tick, io: Tick, total: Tick, priority: u32) -> ProcessSpec {
    ProcessSpec::new(name, burst, io, total, priority)
}

/// Interactive process: one-tick bursts with I/O waits of `think` ticks.
pub fn interactive(name: &str, think: Tick, total: Tick, priority: u32) -> ProcessSpec {
    ProcessSpec::new(name, 1, think, total, priority)
}

/// Mixed population of `n` processes cycling through the archetypes
/// above, with varied sizes. Deterministic for a given `n`.
pub fn mixed(n: usize) -> Vec<ProcessSpec> {
    (0..n)
        .map(|i| {
            let name = format!("p{i}");
            let size = 20 + (i as Tick * 7) % 40;
            let priority = (i % 4) as u32;
            match i % 3 {
                0 => cpu_bound(&name, size, priority),
                1 => io_bound(&name, 3 + (i as Tick % 5), 4 + (i as Tick % 3), size, priority),
                _ => interactive(&name, 2 + (i as Tick % 4), size / 2, priority),
            }
        })
        .collect()
}
