use thiserror::Error;

/// Failures of the pool machinery itself, as opposed to per-file
/// [`PipelineError`](crate::utils::PipelineError)s which are collected into
/// results rather than propagated.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker pool is at capacity: {0}")]
    Capacity(String),

    #[error("worker task failed: {0}")]
    Join(String),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

impl From<tokio::sync::AcquireError> for WorkerError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        WorkerError::Capacity(format!("failed to acquire worker: {err}"))
    }
}

impl From<tokio::task::JoinError> for WorkerError {
    fn from(err: tokio::task::JoinError) -> Self {
        WorkerError::Join(err.to_string())
    }
}
