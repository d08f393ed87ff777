//! Deferred evaluations on a simulated clock.
//!
//! Step pacing and grenade blasts are modelled as tasks due at a future
//! time rather than waits. Tasks due at the same instant run in the order
//! they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::grid::ObjectId;

/// A deferred evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    /// The in-flight conga step has finished animating and pausing.
    StepComplete,
    /// An exploded grenade's blast resolves.
    Blast(ObjectId),
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now_ms: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<(u64, u64, Task)>>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedules `task` to run `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: Task) {
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.push(Reverse((due, self.seq, task)));
        self.seq += 1;
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Task> {
        let Reverse((due, _, _)) = *self.queue.peek()?;
        if due > until_ms {
            return None;
        }
        let Reverse((due, _, task)) = self.queue.pop()?;
        self.now_ms = self.now_ms.max(due);
        Some(task)
    }

    /// Moves the clock forward without running anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops every pending task. The clock keeps its value.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut t = Timeline::new();
        t.schedule(300, Task::StepComplete);
        t.schedule(100, Task::Blast(ObjectId(2)));
        assert_eq!(t.next_due(), Some(100));
        assert_eq!(t.pop_due(1000), Some(Task::Blast(ObjectId(2))));
        assert_eq!(t.now_ms(), 100);
        assert_eq!(t.pop_due(1000), Some(Task::StepComplete));
        assert_eq!(t.now_ms(), 300);
        assert!(t.is_idle());
    }

    #[test]
    fn ties_run_in_schedule_order() {
        let mut t = Timeline::new();
        t.schedule(50, Task::Blast(ObjectId(9)));
        t.schedule(50, Task::Blast(ObjectId(1)));
        assert_eq!(t.pop_due(50), Some(Task::Blast(ObjectId(9))));
        assert_eq!(t.pop_due(50), Some(Task::Blast(ObjectId(1))));
    }

    #[test]
    fn tasks_not_yet_due_stay_queued() {
        let mut t = Timeline::new();
        t.schedule(200, Task::StepComplete);
        assert_eq!(t.pop_due(199), None);
        assert_eq!(t.pending(), 1);
        t.set_now(199);
        assert_eq!(t.now_ms(), 199);
    }

    #[test]
    fn schedule_is_relative_to_now() {
        let mut t = Timeline::new();
        t.set_now(1000);
        t.schedule(10, Task::StepComplete);
        assert_eq!(t.next_due(), Some(1010));
        t.clear();
        assert!(t.is_idle());
        assert_eq!(t.now_ms(), 1000);
    }
}
