//! spool-core
//!
//! Bounded, asynchronous queue for write jobs.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, job）
//! - **ports**: 抽象化レイヤー（Executor, ArchiveWriter）
//! - **impls**: Executor の実装（PooledExecutor, InlineExecutor）
//! - **queue**: TaskQueue 本体（admission, status table, notifiers）
//! - **config**: TOML 設定
//! - **observability**: QueueStats
//! - **error**: エラー型

pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;

pub use config::{ConfigError, ExecutorConfig, QueueConfig};
pub use domain::{Job, Metadata, NotifierId, Outcome, Status, TaskId, WriteError};
pub use error::QueueError;
pub use impls::{InlineExecutor, PooledExecutor};
pub use observability::QueueStats;
pub use ports::{ArchiveWriter, Executor, WriteJob};
pub use queue::{Notifiers, QueueBuilder, Task, TaskQueue};
