//! Core pipeline types and configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`PipelineConfig`]: explicit dependency struct passed to the worker pool
//! - [`ProcessingOptions`]: per-file quality/size search configuration
//! - [`DecodedImage`]: owned pixel buffer produced by validation
//! - [`FileProcessingResult`]: immutable per-file outcome

mod config;
mod types;

pub use config::{DEFAULT_MAX_FILE_SIZE, DEFAULT_WORKERS, PipelineConfig};
pub use types::{
    CompressionAttempt, CompressionOutcome, DEFAULT_QUALITY, DEFAULT_QUALITY_FLOOR,
    DEFAULT_QUALITY_STEP, DEFAULT_TARGET_SIZE_BYTES, DecodedImage, Dimensions,
    FileProcessingResult, ProcessingOptions,
};
