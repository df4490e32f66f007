//! Domain identifiers (strongly-typed IDs).
//!
//! Task と Notifier の ID はどちらも単調増加の `u64` だが、
//! Phantom type でマーカーを付けて混同できないようにしている。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"task-", "notifier-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// IDs are handed out by an [`IdSequence`] and are strictly increasing within
/// the sequence that produced them.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Notifier のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Notifier {}

impl IdMarker for Notifier {
    fn prefix() -> &'static str {
        "notifier-"
    }
}

/// Identifier of an admitted task.
pub type TaskId = Id<Task>;

/// Identifier of a registered completion notifier.
pub type NotifierId = Id<Notifier>;

/// Lock-free allocator for one kind of ID. The first ID is 1.
pub struct IdSequence<T: IdMarker> {
    next: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> IdSequence<T> {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            _marker: PhantomData,
        }
    }

    pub fn allocate(&self) -> Id<T> {
        Id::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl<T: IdMarker> Default for IdSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}
