use crate::core::{FileProcessingResult, ProcessingOptions};
use crate::processing::{ImageValidator, SizeTargetCompressor};
use crate::utils::{PipelineError, PipelineResult};
use std::time::Instant;
use tracing::debug;

/// One uploaded file queued for processing: raw bytes plus the options that
/// govern its size search. The pool takes ownership; nothing is shared.
#[derive(Debug, Clone)]
pub struct FileSubmission {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub options: ProcessingOptions,
}

impl FileSubmission {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, options: ProcessingOptions) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            options,
        }
    }

    /// Check the submission before any decode work.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.filename.trim().is_empty() {
            return Err(PipelineError::invalid_options("filename is empty"));
        }
        self.options.validate()
    }
}

/// Run the full validate -> compress pipeline for one file.
///
/// Always returns a result; failures are recorded on it, never propagated, so
/// one file cannot disturb its siblings in a batch.
pub fn run_pipeline(
    submission: FileSubmission,
    validator: &ImageValidator,
    compressor: &SizeTargetCompressor,
) -> FileProcessingResult {
    let started = Instant::now();
    let original_size = submission.bytes.len() as u64;
    let filename = submission.filename.clone();

    if let Err(e) = submission.validate() {
        return FileProcessingResult::failed(filename, original_size, started.elapsed(), e);
    }

    let decoded = match validator.validate_and_decode(&submission.bytes, &submission.options) {
        Ok(img) => img,
        Err(e) => {
            debug!("Validation failed for {}: {}", filename, e);
            return FileProcessingResult::failed(filename, original_size, started.elapsed(), e);
        }
    };

    match compressor.compress(&decoded, &submission.options) {
        Ok(outcome) => {
            let warning = outcome.unattainable.then(|| PipelineError::SizeUnattainable {
                target: submission.options.target_size_bytes,
                achieved: outcome.encoded_size(),
                quality: outcome.quality,
            });
            debug!(
                "Task completed - File: {}, Original: {}, Final: {}, Quality: {}, Iterations: {}",
                filename,
                original_size,
                outcome.encoded_size(),
                outcome.quality,
                outcome.search_iterations()
            );
            FileProcessingResult {
                filename,
                original_size,
                final_size: outcome.encoded_size(),
                final_quality: outcome.quality,
                dimensions: Some(outcome.dimensions),
                bytes: outcome.bytes,
                elapsed: started.elapsed(),
                error: None,
                warning,
            }
        }
        Err(e) => {
            debug!("Compression failed for {}: {}", filename, e);
            FileProcessingResult::failed(filename, original_size, started.elapsed(), e)
        }
    }
}
