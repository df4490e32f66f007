//! InlineExecutor - submit したスレッドでそのまま実行する
//!
//! Useful when no worker pool is wanted, and for deterministic tests: by the
//! time `submit` returns the task has already completed.

use crate::ports::Executor;
use crate::queue::Task;

#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl InlineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for InlineExecutor {
    fn dispatch(&self, task: Task) {
        task.run();
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}
