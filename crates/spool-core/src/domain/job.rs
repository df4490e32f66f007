//! Job - タスク本体の capability
//!
//! The queue never looks inside a job. It only runs it once and turns the
//! result into an [`Outcome`](super::Outcome).

/// Any error a job (or the writer behind it) may raise.
pub type WriteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Free-form metadata handed to the writer alongside the items.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A unit of work that runs exactly once.
///
/// Closures returning `Result<(), WriteError>` are jobs too:
/// ```ignore
/// queue.submit_fn(|| {
///     std::fs::write("out.json", b"{}")?;
///     Ok(())
/// })?;
/// ```
pub trait Job: Send + 'static {
    fn execute(self: Box<Self>) -> Result<(), WriteError>;
}

impl<F> Job for F
where
    F: FnOnce() -> Result<(), WriteError> + Send + 'static,
{
    fn execute(self: Box<Self>) -> Result<(), WriteError> {
        (*self)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_jobs() {
        let ok: Box<dyn Job> = Box::new(|| -> Result<(), WriteError> { Ok(()) });
        assert!(ok.execute().is_ok());

        let failing: Box<dyn Job> =
            Box::new(|| -> Result<(), WriteError> { Err("no space left".into()) });
        let err = failing.execute().unwrap_err();
        assert_eq!(err.to_string(), "no space left");
    }
}
