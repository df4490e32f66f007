//! Status table: TaskId -> Status bookkeeping.
//!
//! Design:
//! - Entries are created as PENDING at admission.
//! - A terminal entry is evicted as soon as someone has observed it, either
//!   through a lookup or through a notifier broadcast.
//! - The lock is held only for the map operation itself.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{Outcome, Status, TaskId};

#[derive(Default)]
pub(crate) struct StatusTable {
    entries: Mutex<HashMap<TaskId, Status>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, Status>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_pending(&self, id: TaskId) {
        self.lock().insert(id, Status::Pending);
    }

    pub fn complete(&self, id: TaskId, outcome: Outcome) {
        self.lock().insert(id, outcome.into());
    }

    /// Drop the entry after a broadcast delivered it.
    pub fn evict(&self, id: TaskId) {
        self.lock().remove(&id);
    }

    /// Look up a status. A terminal status is evicted by this read, so it is
    /// returned exactly once.
    pub fn observe(&self, id: TaskId) -> Status {
        let mut entries = self.lock();
        match entries.get(&id).copied() {
            Some(status) if status.is_terminal() => {
                entries.remove(&id);
                status
            }
            Some(status) => status,
            None => Status::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.lock()
            .values()
            .filter(|status| **status == Status::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_id_is_unknown() {
        let table = StatusTable::new();
        assert_eq!(table.observe(TaskId::new(1)), Status::Unknown);
    }

    #[test]
    fn pending_is_not_evicted_by_reads() {
        let table = StatusTable::new();
        let id = TaskId::new(1);
        table.insert_pending(id);

        assert_eq!(table.observe(id), Status::Pending);
        assert_eq!(table.observe(id), Status::Pending);
        assert_eq!(table.pending(), 1);
    }

    #[test]
    fn terminal_status_is_returned_once() {
        let table = StatusTable::new();
        let id = TaskId::new(1);
        table.insert_pending(id);
        table.complete(id, Outcome::Failed);

        assert_eq!(table.observe(id), Status::Failed);
        assert_eq!(table.observe(id), Status::Unknown);
        assert!(table.is_empty());
    }

    #[test]
    fn evict_removes_entry() {
        let table = StatusTable::new();
        let id = TaskId::new(1);
        table.insert_pending(id);
        table.complete(id, Outcome::Succeeded);
        table.evict(id);

        assert_eq!(table.len(), 0);
        assert_eq!(table.observe(id), Status::Unknown);
    }
}
