//! Task: one admitted job plus its bound completion.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::state::QueueState;
use crate::domain::{Job, Outcome, TaskId};

/// Completion hook bound to a task at admission.
pub(crate) struct Completion {
    state: Arc<QueueState>,
    id: TaskId,
}

impl Completion {
    pub(crate) fn new(state: Arc<QueueState>, id: TaskId) -> Self {
        Self { state, id }
    }

    fn fire(self, outcome: Outcome) {
        self.state.complete(self.id, outcome);
    }
}

/// An admitted unit of work, executed at most once.
///
/// Whatever happens to it, its completion fires exactly once: after `run`, or
/// with [`Outcome::Failed`] when the task is dropped without having run.
pub struct Task {
    id: TaskId,
    job: Option<Box<dyn Job>>,
    completion: Option<Completion>,
}

impl Task {
    pub(crate) fn new(id: TaskId, job: Box<dyn Job>, completion: Completion) -> Self {
        Self {
            id,
            job: Some(job),
            completion: Some(completion),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Run the job, then fire the completion.
    pub fn run(mut self) -> Outcome {
        let outcome = match self.job.take() {
            Some(job) => execute(self.id, job),
            None => Outcome::Failed,
        };
        if let Some(completion) = self.completion.take() {
            completion.fire(outcome);
        }
        outcome
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let Some(completion) = self.completion.take() {
            tracing::warn!(task = %self.id, "task dropped before it ran");
            completion.fire(Outcome::Failed);
        }
    }
}

// エラーの中身はここで捨てる（ログにだけ残す）
fn execute(id: TaskId, job: Box<dyn Job>) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(move || job.execute())) {
        Ok(Ok(())) => Outcome::Succeeded,
        Ok(Err(e)) => {
            tracing::error!(task = %id, error = %e, "write failed");
            Outcome::Failed
        }
        Err(_) => {
            tracing::error!(task = %id, "write panicked");
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Status, WriteError};

    fn admitted<F>(state: &Arc<QueueState>, id: u64, body: F) -> Task
    where
        F: FnOnce() -> Result<(), WriteError> + Send + 'static,
    {
        let id = TaskId::new(id);
        state.statuses.insert_pending(id);
        state.dispatching();
        state.admitted();
        Task::new(id, Box::new(body), Completion::new(Arc::clone(state), id))
    }

    #[test]
    fn successful_job_completes_succeeded() {
        let state = Arc::new(QueueState::default());
        let task = admitted(&state, 1, || Ok(()));

        assert_eq!(task.run(), Outcome::Succeeded);
        assert_eq!(state.active(), 0);
        assert_eq!(state.outstanding(), 0);
        assert_eq!(state.statuses.observe(TaskId::new(1)), Status::Succeeded);
    }

    #[test]
    fn error_becomes_failed() {
        let state = Arc::new(QueueState::default());
        let task = admitted(&state, 1, || Err("boom".into()));

        assert_eq!(task.run(), Outcome::Failed);
        assert_eq!(state.statuses.observe(TaskId::new(1)), Status::Failed);
    }

    #[test]
    fn panic_becomes_failed() {
        let state = Arc::new(QueueState::default());
        let task = admitted(&state, 1, || panic!("writer bug"));

        assert_eq!(task.run(), Outcome::Failed);
        assert_eq!(state.active(), 0);
    }

    #[test]
    fn dropped_task_fails_and_releases_slot() {
        let state = Arc::new(QueueState::default());
        let task = admitted(&state, 1, || Ok(()));
        assert_eq!(state.active(), 1);

        drop(task);

        assert_eq!(state.active(), 0);
        assert_eq!(state.outstanding(), 0);
        assert_eq!(state.statuses.observe(TaskId::new(1)), Status::Failed);
    }

    #[test]
    fn delivered_completion_is_evicted() {
        let state = Arc::new(QueueState::default());
        state.notifiers.add(|_, _| {});
        let task = admitted(&state, 1, || Ok(()));

        task.run();

        assert!(state.statuses.is_empty());
    }
}
