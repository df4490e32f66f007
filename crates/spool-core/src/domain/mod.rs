//! Domain model (IDs, statuses, jobs).

pub mod ids;
pub mod job;
pub mod status;

pub use ids::{IdSequence, NotifierId, TaskId};
pub use job::{Job, Metadata, WriteError};
pub use status::{Outcome, Status};
