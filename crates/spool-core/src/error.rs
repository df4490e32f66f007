use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(
        "unable to queue task; {:.3}-second time limit expired after {:.3}s",
        timeout.as_secs_f64(),
        waited.as_secs_f64()
    )]
    AdmissionTimeout { timeout: Duration, waited: Duration },

    #[error("failed to start worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
