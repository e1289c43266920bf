use std::collections::VecDeque;

use serde::Serialize;

/// Work the engine defers to a later host step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    /// One-shot gate evaluation after a round restart settles.
    ApplyGate,
    RainbowTick { generation: u64 },
}

/// Returned by a task when it runs; there is no cancel-by-handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskOutcome {
    Done,
    Reschedule(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledTask {
    pub due: f64,
    pub task: Task,
}

/// Keeps delayed tasks ordered by due time. Tasks due at the same instant run
/// in the order they were scheduled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskScheduler {
    now: f64,
    pending: VecDeque<ScheduledTask>,
    completed: u64,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule(&mut self, delay: f64, task: Task) {
        let due = self.now + delay.max(0.0);
        let position = self
            .pending
            .iter()
            .position(|entry| entry.due > due)
            .unwrap_or(self.pending.len());
        self.pending.insert(position, ScheduledTask { due, task });
    }

    /// Pops the earliest task due no later than `until` and moves the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: f64) -> Option<ScheduledTask> {
        if self.pending.front()?.due > until {
            return None;
        }
        let entry = self.pending.pop_front()?;
        self.now = self.now.max(entry.due);
        self.completed += 1;
        Some(entry)
    }

    pub fn settle(&mut self, until: f64) {
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl ExactSizeIterator<Item = &ScheduledTask> {
        self.pending.iter()
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskScheduler};

    #[test]
    fn pops_in_due_order_then_insertion_order() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule(0.3, Task::RainbowTick { generation: 1 });
        scheduler.schedule(0.1, Task::ApplyGate);
        scheduler.schedule(0.3, Task::RainbowTick { generation: 2 });
        assert_eq!(scheduler.len(), 3);

        assert!(scheduler.pop_due(0.05).is_none());
        let first = scheduler.pop_due(1.0).expect("gate task due");
        assert_eq!(first.task, Task::ApplyGate);
        assert!((scheduler.now() - 0.1).abs() < 1e-9);

        let drained: Vec<Task> = std::iter::from_fn(|| scheduler.pop_due(1.0))
            .map(|entry| entry.task)
            .collect();
        assert_eq!(
            drained,
            vec![
                Task::RainbowTick { generation: 1 },
                Task::RainbowTick { generation: 2 }
            ]
        );
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.completed(), 3);
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut scheduler = TaskScheduler::new();
        scheduler.settle(5.0);
        scheduler.schedule(0.1, Task::ApplyGate);
        assert!(scheduler.pop_due(5.05).is_none());
        assert!(scheduler.pop_due(5.1).is_some());
    }

    #[test]
    fn clear_drops_pending_work() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule(0.1, Task::ApplyGate);
        scheduler.clear();
        assert!(scheduler.pop_due(10.0).is_none());
    }
}
