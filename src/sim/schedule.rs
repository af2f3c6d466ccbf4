//! One-shot deferred tasks
//!
//! Every task belongs to an entity. The entity keeps the returned handle and
//! cancels it when it is destroyed, so nothing fires against a dead entity.

use serde::{Deserialize, Serialize};

/// Handle to a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(u32);

/// Deferred work the simulation knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Make a trail segment collidable
    ActivateTrail,
    /// Start fading a trail segment out
    FadeTrail,
    /// Remove a faded trail segment
    ExpireTrail,
    /// Remove an exploded bike
    DestroyPlayer,
    /// Start fading an explosion out
    FadeExplosion,
    /// Remove an explosion
    ExpireExplosion,
}

/// A task waiting for its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub handle: TaskHandle,
    /// Entity the task acts on
    pub owner: u32,
    pub due_tick: u64,
    pub task: Task,
}

/// Pending tasks ordered by due tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    next_handle: u32,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for `owner` to run on `due_tick`
    pub fn schedule(&mut self, owner: u32, due_tick: u64, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push(ScheduledTask {
            handle,
            owner,
            due_tick,
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle != handle);
        self.pending.len() != before
    }

    /// Cancel every pending task belonging to `owner`
    pub fn cancel_owned_by(&mut self, owner: u32) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.owner != owner);
        before - self.pending.len()
    }

    /// Remove and return all tasks due at or before `tick`, oldest first
    pub fn take_due(&mut self, tick: u64) -> Vec<ScheduledTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|t| t.due_tick <= tick);
        self.pending = pending;
        due.sort_by_key(|t| (t.due_tick, t.handle));
        due
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything (teardown)
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_orders_by_tick_then_handle() {
        let mut scheduler = Scheduler::new();
        let late = scheduler.schedule(1, 10, Task::ExpireTrail);
        let first = scheduler.schedule(2, 5, Task::ActivateTrail);
        let second = scheduler.schedule(3, 5, Task::DestroyPlayer);

        assert!(scheduler.take_due(4).is_empty());

        let due = scheduler.take_due(5);
        let handles: Vec<_> = due.iter().map(|t| t.handle).collect();
        assert_eq!(handles, vec![first, second]);
        assert!(scheduler.is_pending(late));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(7, 3, Task::FadeExplosion);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.take_due(100).is_empty());
    }

    #[test]
    fn test_cancel_owned_by() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1, 3, Task::ActivateTrail);
        scheduler.schedule(1, 4, Task::FadeTrail);
        let other = scheduler.schedule(2, 4, Task::FadeTrail);
        assert_eq!(scheduler.cancel_owned_by(1), 2);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_pending(other));
    }
}
