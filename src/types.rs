//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (process IDs, queue levels) prevent silent type
//! confusion between an index into the runtime table and a queue number.
//! Plain quantities (ticks) stay as a type alias.

use std::fmt;

use serde::{Serialize, Serializer};

/// Simulated time, in ticks. One tick is one unit of CPU work.
pub type Tick = u64;

/// Process identifier.
///
/// Dense index assigned in admission order (ascending priority, ties by
/// input order), so `Pid(0)` is the first runtime placed in Level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl Pid {
    /// PID for a runtime-table index. `None` past `u32::MAX`.
    pub fn from_index(index: usize) -> Option<Pid> {
        u32::try_from(index).ok().map(Pid)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feedback queue level. Level 0 has the highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub const TOP: Level = Level(0);
    pub const MIDDLE: Level = Level(1);
    /// FCFS level: runtimes here are never interrupted by their own quantum.
    pub const BOTTOM: Level = Level(2);

    /// All levels in dispatch order.
    pub const ALL: [Level; NR_LEVELS] = [Level::TOP, Level::MIDDLE, Level::BOTTOM];

    pub fn new(raw: u8) -> Option<Self> {
        (usize::from(raw) < NR_LEVELS).then_some(Level(raw))
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The level a runtime lands on after exhausting its quantum here.
    /// The bottom level demotes to itself.
    pub fn demoted(self) -> Level {
        Level((self.0 + 1).min(Level::BOTTOM.0))
    }

    pub fn is_bottom(self) -> bool {
        self == Level::BOTTOM
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// Number of feedback queue levels.
pub const NR_LEVELS: usize = 3;

/// CPU ticks a runtime may use before it is forced off the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantum {
    Ticks(Tick),
    /// FCFS: runs until it blocks or finishes.
    Unbounded,
}

impl Quantum {
    /// Consume one tick. No-op for an unbounded quantum.
    pub fn consume(&mut self) {
        if let Quantum::Ticks(n) = self {
            *n = n.saturating_sub(1);
        }
    }

    pub fn is_expired(self) -> bool {
        matches!(self, Quantum::Ticks(0))
    }
}

impl fmt::Display for Quantum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantum::Ticks(n) => write!(f, "{n}"),
            Quantum::Unbounded => f.write_str("inf"),
        }
    }
}
