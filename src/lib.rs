//! Adaptive, size-constrained image compression pipeline.
//!
//! Takes raw uploaded image bytes and a byte-size budget, and produces an
//! encoded image that meets the budget while minimizing visual-quality loss,
//! executed under bounded concurrency across many simultaneous files.
//!
//! The stages: validation (byte ceiling, content sniffing, decode, dimension
//! ceiling), a from-scratch Lanczos resampler parallelized by row bands, and
//! an iterative quality/dimension search driven by the sqrt(target/current)
//! size heuristic. A semaphore-bounded worker pool fans a batch out across
//! these stages and fans the per-file results back in.
//!
//! Everything beyond the pipeline — HTTP, form parsing, persistence, upload —
//! is an external collaborator behind the narrow seams in [`storage`].

// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod storage;
pub mod worker;

// Public exports for external consumers
pub use core::{
    CompressionAttempt, CompressionOutcome, DecodedImage, Dimensions, FileProcessingResult,
    PipelineConfig, ProcessingOptions,
};
pub use processing::{ImageValidator, Resampler, SizeTargetCompressor};
pub use storage::{BlobStore, MemoryBlobStore, StorageError, object_key, sanitize_folder};
pub use utils::{ErrorKind, ImageFormat, PipelineError, PipelineResult};
pub use worker::{BatchStatus, BatchSummary, FileSubmission, WorkerError, WorkerPool};
