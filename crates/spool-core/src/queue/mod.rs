//! Queue module: bounded admission, status bookkeeping and completion fan-out.
//!
//! Flow of one task:
//! 1. `submit` waits (polling) until `active < capacity`, or times out
//! 2. under the admission lock: a TaskId is allocated, PENDING recorded, the
//!    task handed to the executor, then counted as active
//! 3. on completion the trampoline records the outcome, notifies, and
//!    releases the slot

mod builder;
mod notifier;
mod state;
mod status_table;
mod task;

pub use builder::QueueBuilder;
pub use notifier::Notifiers;
pub use task::Task;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::QueueConfig;
use crate::domain::ids::{self, IdSequence};
use crate::domain::{Job, Metadata, NotifierId, Status, TaskId, WriteError};
use crate::error::QueueError;
use crate::observability::QueueStats;
use crate::ports::{ArchiveWriter, Executor, WriteJob};
use state::QueueState;
use task::Completion;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Bounded queue of write tasks.
///
/// Dropping the queue blocks until every admitted task has completed. There
/// is no way to cancel a task, so a task that never finishes makes the drop
/// block forever; callers must only submit work that can complete.
pub struct TaskQueue {
    state: Arc<QueueState>,
    task_ids: IdSequence<ids::Task>,
    /// Serializes check-capacity / dispatch / count. Never held while sleeping.
    admission: Mutex<()>,
    capacity: AtomicUsize,
    timeout_nanos: AtomicU64,
    poll_interval: Duration,
    executor: Box<dyn Executor>,
}

impl TaskQueue {
    pub fn builder() -> QueueBuilder {
        QueueBuilder::new()
    }

    pub fn new<E>(capacity: usize, timeout: Duration, executor: E) -> Self
    where
        E: Executor + 'static,
    {
        Self::with_parts(capacity, timeout, DEFAULT_POLL_INTERVAL, Box::new(executor))
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self, QueueError> {
        QueueBuilder::from_config(config).build()
    }

    fn with_parts(
        capacity: usize,
        timeout: Duration,
        poll_interval: Duration,
        executor: Box<dyn Executor>,
    ) -> Self {
        let queue = Self {
            state: Arc::new(QueueState::default()),
            task_ids: IdSequence::new(),
            admission: Mutex::new(()),
            capacity: AtomicUsize::new(capacity.max(1)),
            timeout_nanos: AtomicU64::new(duration_to_nanos(timeout)),
            poll_interval,
            executor,
        };
        tracing::debug!(
            capacity = queue.capacity(),
            timeout = ?timeout,
            executor = queue.executor.name(),
            "task queue created"
        );
        queue
    }

    // ------------------------------------------------------------------
    // submission
    // ------------------------------------------------------------------

    /// Queue a write of `items` to `destination`.
    ///
    /// Blocks while the queue is at capacity. Fails with
    /// [`QueueError::AdmissionTimeout`] if no slot frees up within
    /// [`timeout`](Self::timeout); in that case nothing is queued and no id is
    /// consumed.
    pub fn submit<I, W>(
        &self,
        items: Vec<I>,
        destination: W,
        metadata: Metadata,
    ) -> Result<TaskId, QueueError>
    where
        I: Send + 'static,
        W: ArchiveWriter<I> + 'static,
    {
        self.submit_job(WriteJob::new(items, destination, metadata))
    }

    /// Queue a write of a single item.
    pub fn submit_one<I, W>(
        &self,
        item: I,
        destination: W,
        metadata: Metadata,
    ) -> Result<TaskId, QueueError>
    where
        I: Send + 'static,
        W: ArchiveWriter<I> + 'static,
    {
        self.submit(vec![item], destination, metadata)
    }

    /// Queue an arbitrary job under the same admission rules as `submit`.
    ///
    /// With the inline executor the job runs while the admission lock is
    /// held, so concurrent inline submitters run one at a time.
    pub fn submit_job<J: Job>(&self, job: J) -> Result<TaskId, QueueError> {
        let started = Instant::now();
        loop {
            {
                let _admission = self
                    .admission
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if self.can_admit() {
                    return Ok(self.admit(Box::new(job)));
                }
            }
            self.check_deadline(started)?;
            tracing::trace!(active = self.size(), "queue full, waiting");
            thread::sleep(self.poll_interval);
        }
    }

    pub fn submit_fn<F>(&self, f: F) -> Result<TaskId, QueueError>
    where
        F: FnOnce() -> Result<(), WriteError> + Send + 'static,
    {
        self.submit_job(f)
    }

    /// Like [`submit`](Self::submit), but waits for capacity without blocking
    /// the calling thread.
    pub async fn submit_async<I, W>(
        &self,
        items: Vec<I>,
        destination: W,
        metadata: Metadata,
    ) -> Result<TaskId, QueueError>
    where
        I: Send + 'static,
        W: ArchiveWriter<I> + 'static,
    {
        self.submit_job_async(WriteJob::new(items, destination, metadata))
            .await
    }

    /// The admission lock is only ever tried here, so a busy lock counts as
    /// "no slot yet" and the runtime thread is never blocked on it.
    pub async fn submit_job_async<J: Job>(&self, job: J) -> Result<TaskId, QueueError> {
        let started = Instant::now();
        loop {
            {
                let admission = self.try_admission();
                if admission.is_some() && self.can_admit() {
                    return Ok(self.admit(Box::new(job)));
                }
            }
            self.check_deadline(started)?;
            tracing::trace!(active = self.size(), "queue full, waiting");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn try_admission(&self) -> Option<MutexGuard<'_, ()>> {
        match self.admission.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    fn can_admit(&self) -> bool {
        self.state.active() < self.capacity() as i64
    }

    fn check_deadline(&self, started: Instant) -> Result<(), QueueError> {
        let waited = started.elapsed();
        let timeout = self.timeout();
        if waited > timeout {
            tracing::warn!(
                capacity = self.capacity(),
                active = self.size(),
                ?timeout,
                "admission timed out"
            );
            return Err(QueueError::AdmissionTimeout { timeout, waited });
        }
        Ok(())
    }

    // admission lock を持った状態で呼ぶこと
    fn admit(&self, job: Box<dyn Job>) -> TaskId {
        let id = self.task_ids.allocate();
        // PENDING を先に書く（完了通知が PENDING より先に見えないように）
        self.state.statuses.insert_pending(id);

        let task = Task::new(id, job, Completion::new(Arc::clone(&self.state), id));
        tracing::debug!(task = %id, executor = self.executor.name(), "task admitted");
        self.state.dispatching();
        self.executor.dispatch(task);

        // hand-off が終わってからカウントする
        self.state.admitted();
        id
    }

    // ------------------------------------------------------------------
    // status
    // ------------------------------------------------------------------

    /// Current status of `id`.
    ///
    /// A terminal status (SUCCEEDED / FAILED) is returned once; the entry is
    /// evicted by this read and later lookups answer UNKNOWN.
    pub fn status(&self, id: TaskId) -> Status {
        self.state.statuses.observe(id)
    }

    // ------------------------------------------------------------------
    // notifiers
    // ------------------------------------------------------------------

    /// Register a callback invoked once per completed task, on the thread that
    /// completed it.
    pub fn add_notifier<F>(&self, callback: F) -> NotifierId
    where
        F: Fn(TaskId, Status) + Send + Sync + 'static,
    {
        self.state.notifiers.add(callback)
    }

    pub fn remove_notifier(&self, id: NotifierId) -> bool {
        self.state.notifiers.remove(id)
    }

    pub fn clear_notifiers(&self) {
        self.state.notifiers.clear();
    }

    /// Handle for managing notifiers from inside a callback.
    pub fn notifiers(&self) -> Notifiers {
        self.state.notifiers.clone()
    }

    // ------------------------------------------------------------------
    // configuration
    // ------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Set the number of tasks allowed in flight. Values below 1 become 1.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity.max(1), Ordering::Release);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_nanos(self.timeout_nanos.load(Ordering::Acquire))
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_nanos
            .store(duration_to_nanos(timeout), Ordering::Release);
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ------------------------------------------------------------------
    // observability
    // ------------------------------------------------------------------

    /// Number of tasks handed to the executor whose completion has not
    /// finished yet.
    pub fn size(&self) -> usize {
        self.state.outstanding()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            active: self.size(),
            capacity: self.capacity(),
            tracked: self.state.statuses.len(),
            pending: self.state.statuses.pending(),
            notifiers: self.state.notifiers.len(),
        }
    }

    /// Block until every admitted task has completed.
    pub fn wait_until_empty(&self) {
        if self.is_empty() {
            return;
        }
        tracing::debug!(active = self.size(), "waiting for outstanding tasks");
        while !self.is_empty() {
            thread::sleep(self.poll_interval);
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.wait_until_empty();
    }
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
