//! Status - タスクの状態
//!
//! State transitions:
//! - (admission) -> Pending -> Succeeded
//! - (admission) -> Pending -> Failed
//!
//! `Unknown` is never stored. It is what a lookup answers for an id that is
//! not tracked: never admitted, or already evicted after being observed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally visible status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Unknown,
    Pending,
    Succeeded,
    Failed,
}

impl Status {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "UNKNOWN",
            Status::Pending => "PENDING",
            Status::Succeeded => "SUCCEEDED",
            Status::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Result of running a task body. Only terminal states can be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => Status::Succeeded,
            Outcome::Failed => Status::Failed,
        }
    }
}

impl<E> From<&Result<(), E>> for Outcome {
    fn from(result: &Result<(), E>) -> Self {
        if result.is_ok() {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_required_names() {
        let s = serde_json::to_string(&Status::Pending).unwrap();
        assert_eq!(s, "\"PENDING\"");

        let s = serde_json::to_string(&Status::Unknown).unwrap();
        assert_eq!(s, "\"UNKNOWN\"");
    }

    #[test]
    fn only_outcomes_are_terminal() {
        assert!(!Status::Unknown.is_terminal());
        assert!(!Status::Pending.is_terminal());
        assert!(Status::from(Outcome::Succeeded).is_terminal());
        assert!(Status::from(Outcome::Failed).is_terminal());
    }

    #[test]
    fn outcome_follows_result() {
        let ok: Result<(), String> = Ok(());
        let err: Result<(), String> = Err("disk full".to_string());
        assert_eq!(Outcome::from(&ok), Outcome::Succeeded);
        assert_eq!(Outcome::from(&err), Outcome::Failed);
    }
}
