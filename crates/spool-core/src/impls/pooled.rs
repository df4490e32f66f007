//! PooledExecutor - tokio の blocking pool でタスクを実行
//!
//! # 学習ポイント
//! - 書き込みは同期 I/O なので `spawn_blocking` に載せる
//! - 専用 Runtime を持つ場合と、既存 Runtime の Handle を借りる場合がある
//! - Runtime の drop は async context では panic するので shutdown_background を使う

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::QueueError;
use crate::ports::Executor;
use crate::queue::Task;

/// Runs each task on a tokio blocking-pool thread.
///
/// The completion fires from that worker thread.
pub struct PooledExecutor {
    handle: Handle,
    /// Present only when this executor started its own runtime.
    runtime: Option<Runtime>,
}

impl PooledExecutor {
    /// Start a dedicated runtime with at most `workers` blocking threads.
    pub fn new(workers: usize) -> Result<Self, QueueError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers.max(1))
            .thread_name("spool-worker")
            .build()
            .map_err(QueueError::Runtime)?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Borrow an existing runtime. The runtime must outlive the queue.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
        }
    }

    /// Borrow the runtime this thread is running in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }
}

impl Executor for PooledExecutor {
    fn dispatch(&self, task: Task) {
        tracing::debug!(task = %task.id(), "dispatching to blocking pool");
        // JoinHandle は使わない（完了は trampoline 経由で通知される）
        drop(self.handle.spawn_blocking(move || {
            task.run();
        }));
    }

    fn name(&self) -> &'static str {
        "pooled"
    }
}

impl Drop for PooledExecutor {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
