mod aggregate;
mod error;
mod pool;
mod task;

pub use aggregate::{BatchStatus, BatchSummary};
pub use error::{WorkerError, WorkerResult};
pub use pool::WorkerPool;
pub use task::{FileSubmission, run_pipeline};
