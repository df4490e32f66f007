//! Ports - 抽象化レイヤー
//!
//! Seams between the queue and the things it does not own: where task
//! bodies run, and what actually performs a write.

pub mod archive_writer;
pub mod executor;

pub use self::archive_writer::{ArchiveWriter, WriteJob};
pub use self::executor::Executor;
