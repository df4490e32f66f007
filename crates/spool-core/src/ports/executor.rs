//! Executor port - タスク本体をどこで実行するか
//!
//! # 実装
//! - **PooledExecutor**: tokio の blocking pool で実行（別スレッド）
//! - **InlineExecutor**: submit したスレッドでその場で実行

use crate::queue::Task;

/// Runs tasks handed over by the queue.
///
/// # 契約
/// - `dispatch` は受け取った task を必ず 1 回だけ実行するか、drop する
///   （drop された task は FAILED として完了する）
/// - the queue records PENDING before calling `dispatch` and counts the task
///   as active only after `dispatch` returns
pub trait Executor: Send + Sync {
    fn dispatch(&self, task: Task);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
