//! ArchiveWriter port - 実際の書き込み処理（外部コラボレータ）
//!
//! Serialization and file formats live entirely behind this trait.
//! The queue only learns whether `write` succeeded.

use crate::domain::{Job, Metadata, WriteError};

/// Destination that persists a batch of items.
///
/// # 設計原則
/// - `&self` で呼ばれる（1 つの writer は 1 タスクにだけ渡される）
/// - エラーの中身は queue の外には出ない（ログにのみ残る）
pub trait ArchiveWriter<I>: Send + Sync {
    fn write(&self, items: &[I], metadata: &Metadata) -> Result<(), WriteError>;
}

/// Job that hands `items` and `metadata` to a writer.
pub struct WriteJob<I, W> {
    items: Vec<I>,
    destination: W,
    metadata: Metadata,
}

impl<I, W> WriteJob<I, W>
where
    I: Send + 'static,
    W: ArchiveWriter<I> + 'static,
{
    pub fn new(items: Vec<I>, destination: W, metadata: Metadata) -> Self {
        Self {
            items,
            destination,
            metadata,
        }
    }
}

impl<I, W> Job for WriteJob<I, W>
where
    I: Send + 'static,
    W: ArchiveWriter<I> + 'static,
{
    fn execute(self: Box<Self>) -> Result<(), WriteError> {
        self.destination.write(&self.items, &self.metadata)
    }
}
