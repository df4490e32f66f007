//! Notifier registry: completion callbacks, fanned out in registration order.
//!
//! Broadcast semantics:
//! - The set of callbacks is snapshotted under the registry lock when a
//!   broadcast starts; callbacks then run with the lock released.
//! - A callback may add, remove or clear notifiers (including itself).
//! - A notifier removed mid-broadcast is skipped if its turn has not come yet.
//!   A notifier added mid-broadcast first hears about the next completion.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::ids::{IdSequence, Notifier};
use crate::domain::{NotifierId, Status, TaskId};

/// Completion callback.
pub(crate) type Callback = Arc<dyn Fn(TaskId, Status) + Send + Sync>;

#[derive(Default)]
struct Registry {
    ids: IdSequence<Notifier>,
    callbacks: Mutex<BTreeMap<NotifierId, Callback>>,
}

/// Shared handle to a queue's notifier registry.
///
/// Cloning is cheap; every clone manages the same registry. Callbacks that
/// need to manage notifiers should capture a clone of this handle rather than
/// the queue itself.
#[derive(Clone, Default)]
pub struct Notifiers {
    registry: Arc<Registry>,
}

impl Notifiers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<NotifierId, Callback>> {
        self.registry
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add<F>(&self, callback: F) -> NotifierId
    where
        F: Fn(TaskId, Status) + Send + Sync + 'static,
    {
        let mut callbacks = self.lock();
        // id は lock 内で採番する（id 順 = 登録順を保つ）
        let id = self.registry.ids.allocate();
        callbacks.insert(id, Arc::new(callback));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn remove(&self, id: NotifierId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, id: NotifierId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `(task, status)` to every registered notifier.
    ///
    /// Returns how many notifiers were invoked. A panicking callback is
    /// logged and counted; the remaining callbacks still run.
    pub(crate) fn broadcast(&self, task: TaskId, status: Status) -> usize {
        let snapshot: Vec<(NotifierId, Callback)> = self
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.contains(id) {
                continue;
            }
            delivered += 1;
            if panic::catch_unwind(AssertUnwindSafe(|| callback(task, status))).is_err() {
                tracing::error!(notifier = %id, task = %task, "notifier panicked");
            }
        }
        delivered
    }
}
