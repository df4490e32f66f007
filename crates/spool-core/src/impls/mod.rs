//! Impls - Executor の実装
//!
//! # 含まれる実装
//! - **PooledExecutor**: tokio blocking pool（本番用）
//! - **InlineExecutor**: 同期実行（フォールバック・テスト用）

pub mod inline;
pub mod pooled;

pub use self::inline::InlineExecutor;
pub use self::pooled::PooledExecutor;
