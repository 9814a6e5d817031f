//! Ready queues and the blocked set.
//!
//! Each feedback level is a plain FIFO of PIDs. Preempted runtimes go back
//! to the head of their level so they keep their place; everything else is
//! appended at the tail.

use std::collections::VecDeque;

use crate::task::ProcessRuntime;
use crate::types::{Level, Pid, NR_LEVELS};

/// A single FIFO ready queue.
#[derive(Debug, Clone, Default)]
pub struct LevelQueue {
    entries: VecDeque<Pid>,
}

impl LevelQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail.
    pub fn push_back(&mut self, pid: Pid) {
        debug_assert!(!self.contains(pid), "pid {pid} queued twice");
        self.entries.push_back(pid);
    }

    /// Re-insert at the head.
    pub fn push_front(&mut self, pid: Pid) {
        debug_assert!(!self.contains(pid), "pid {pid} queued twice");
        self.entries.push_front(pid);
    }

    pub fn pop(&mut self) -> Option<Pid> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries.contains(&pid)
    }

    /// All PIDs in dispatch order without consuming.
    pub fn ordered_pids(&self) -> Vec<Pid> {
        self.entries.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().copied()
    }
}

/// The three feedback levels.
#[derive(Debug, Clone, Default)]
pub struct QueueSet {
    levels: [LevelQueue; NR_LEVELS],
}

impl QueueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, level: Level) -> &LevelQueue {
        &self.levels[level.index()]
    }

    pub fn level_mut(&mut self, level: Level) -> &mut LevelQueue {
        &mut self.levels[level.index()]
    }

    /// Pop the head of the first non-empty level, scanning from the top.
    pub fn pop_highest(&mut self) -> Option<(Level, Pid)> {
        Level::ALL
            .into_iter()
            .find_map(|level| self.level_mut(level).pop().map(|pid| (level, pid)))
    }

    /// Total number of ready runtimes.
    pub fn len(&self) -> usize {
        self.levels.iter().map(LevelQueue::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(LevelQueue::is_empty)
    }

    /// Every queued PID, top level first.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.levels.iter().flat_map(LevelQueue::iter)
    }
}

/// Runtimes currently performing I/O, in the order they blocked.
///
/// The countdown itself lives on the runtime (`remaining_io`); this set only
/// fixes the release order so that runtimes finishing I/O on the same tick
/// re-enter their queues deterministically.
#[derive(Debug, Clone, Default)]
pub struct BlockedSet {
    entries: Vec<Pid>,
}

impl BlockedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pid: Pid) {
        debug_assert!(!self.entries.contains(&pid), "pid {pid} blocked twice");
        self.entries.push(pid);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries.contains(&pid)
    }

    pub fn ordered_pids(&self) -> Vec<Pid> {
        self.entries.clone()
    }

    /// Service one tick of I/O.
    ///
    /// Runtimes whose countdown already reached zero on an earlier tick are
    /// removed and returned (in blocking order); every other entry has its
    /// countdown decremented. The caller unblocks and requeues the returned
    /// runtimes.
    pub fn service(&mut self, runtimes: &mut [ProcessRuntime]) -> Vec<Pid> {
        let mut released = Vec::new();
        self.entries.retain(|&pid| {
            let rt = &mut runtimes[pid.index()];
            if rt.remaining_io == 0 {
                released.push(pid);
                false
            } else {
                rt.remaining_io -= 1;
                true
            }
        });
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ProcessSpec;

    #[test]
    fn test_fifo_with_head_reinsert() {
        let mut q = LevelQueue::new();
        q.push_back(Pid(1));
        q.push_back(Pid(2));
        q.push_front(Pid(3));
        assert_eq!(q.ordered_pids(), vec![Pid(3), Pid(1), Pid(2)]);
        assert_eq!(q.pop(), Some(Pid(3)));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_pop_highest_scans_top_down() {
        let mut qs = QueueSet::new();
        qs.level_mut(Level::BOTTOM).push_back(Pid(7));
        qs.level_mut(Level::MIDDLE).push_back(Pid(5));
        assert_eq!(qs.pop_highest(), Some((Level::MIDDLE, Pid(5))));
        assert_eq!(qs.pop_highest(), Some((Level::BOTTOM, Pid(7))));
        assert_eq!(qs.pop_highest(), None);
        assert!(qs.is_empty());
    }

    #[test]
    fn test_blocked_service_releases_after_countdown() {
        let mut runtimes = vec![
            ProcessRuntime::new(Pid(0), ProcessSpec::new("a", 1, 2, 5, 0)),
            ProcessRuntime::new(Pid(1), ProcessSpec::new("b", 1, 1, 5, 0)),
        ];
        let mut blocked = BlockedSet::new();
        for rt in runtimes.iter_mut() {
            rt.block();
            blocked.insert(rt.pid);
        }

        // a: 2 -> 1, b: 1 -> 0
        assert!(blocked.service(&mut runtimes).is_empty());
        // a: 1 -> 0, b released
        assert_eq!(blocked.service(&mut runtimes), vec![Pid(1)]);
        assert_eq!(blocked.service(&mut runtimes), vec![Pid(0)]);
        assert!(blocked.is_empty());
    }
}
