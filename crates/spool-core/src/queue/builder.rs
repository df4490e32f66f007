//! QueueBuilder - TaskQueue の構築
//!
//! # 使用例
//! ```ignore
//! let queue = TaskQueue::builder()
//!     .capacity(8)
//!     .timeout(Duration::from_secs(30))
//!     .executor(InlineExecutor::new())
//!     .build()?;
//! ```
//!
//! executor を指定しなければ capacity 本の blocking thread を持つ
//! PooledExecutor が作られる。

use std::time::Duration;

use super::{DEFAULT_CAPACITY, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, TaskQueue};
use crate::config::{ExecutorConfig, QueueConfig};
use crate::error::QueueError;
use crate::impls::{InlineExecutor, PooledExecutor};
use crate::ports::Executor;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct QueueBuilder {
    capacity: usize,
    timeout: Duration,
    poll_interval: Duration,
    executor: Option<Box<dyn Executor>>,
    workers: Option<usize>,
}

impl QueueBuilder {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            executor: None,
            workers: None,
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        let builder = Self::new()
            .capacity(config.capacity)
            .timeout(config.timeout())
            .poll_interval(config.poll_interval());
        match config.executor {
            ExecutorConfig::Inline => builder.executor(InlineExecutor::new()),
            ExecutorConfig::Pooled { workers } => Self { workers, ..builder },
        }
    }

    /// Values below 1 become 1.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often a blocked `submit` (and the drop drain) rechecks capacity.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn executor<E: Executor + 'static>(mut self, executor: E) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Number of worker threads for the default pooled executor.
    /// Ignored when an executor is supplied.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<TaskQueue, QueueError> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Box::new(PooledExecutor::new(self.workers.unwrap_or(self.capacity))?),
        };
        Ok(TaskQueue::with_parts(
            self.capacity,
            self.timeout,
            self.poll_interval,
            executor,
        ))
    }
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}
