//! Shared queue state and the completion trampoline.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use super::notifier::Notifiers;
use super::status_table::StatusTable;
use crate::domain::{Outcome, TaskId};

/// Everything a running task writes back into.
///
/// Two counters:
/// - `active` is bumped after hand-off and only feeds admission decisions.
///   It is signed: a task may complete (and decrement) before the submitter
///   has incremented. Each admission/completion pair nets to zero.
/// - `outstanding` is bumped before hand-off and dropped as the very last
///   step of completion, so it never under-reports work in flight. Size,
///   emptiness and the drain read this one.
#[derive(Default)]
pub(crate) struct QueueState {
    pub(crate) statuses: StatusTable,
    pub(crate) notifiers: Notifiers,
    active: AtomicI64,
    outstanding: AtomicUsize,
}

impl QueueState {
    pub(crate) fn active(&self) -> i64 {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Called right before the task is handed to the executor.
    pub(crate) fn dispatching(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// Called once the executor has taken the task.
    pub(crate) fn admitted(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Completion trampoline. Runs once per task, on the completing thread.
    ///
    /// Order matters:
    /// 1. terminal status goes into the table
    /// 2. notifiers hear about it; if any did, the entry counts as observed
    /// 3. only then the slot is released, and the task stops being outstanding
    pub(crate) fn complete(&self, id: TaskId, outcome: Outcome) {
        self.statuses.complete(id, outcome);

        let delivered = self.notifiers.broadcast(id, outcome.into());
        if delivered > 0 {
            self.statuses.evict(id);
        }

        tracing::debug!(task = %id, ?outcome, delivered, "task completed");
        self.active.fetch_sub(1, Ordering::AcqRel);
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}
