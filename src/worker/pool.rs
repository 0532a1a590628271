use crate::core::{FileProcessingResult, PipelineConfig};
use crate::processing::{ImageValidator, Resampler, SizeTargetCompressor};
use crate::worker::aggregate::BatchSummary;
use crate::worker::error::{WorkerError, WorkerResult};
use crate::worker::task::{FileSubmission, run_pipeline};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct WorkerGauge {
    active: usize,
    peak: usize,
}

/// Bounded-concurrency scheduler for per-file pipelines.
///
/// A counting semaphore admits at most `worker_count` submissions into the
/// decode/compress phase; the rest wait cooperatively. Each admitted file runs
/// validate -> compress on the blocking pool and owns its pixel data
/// end-to-end, so workers share nothing mutable.
#[derive(Clone)]
pub struct WorkerPool {
    config: PipelineConfig,
    validator: Arc<ImageValidator>,
    compressor: Arc<SizeTargetCompressor>,
    semaphore: Arc<Semaphore>,
    gauge: Arc<Mutex<WorkerGauge>>,
}

impl WorkerPool {
    pub fn new(config: PipelineConfig) -> Self {
        let validator = Arc::new(ImageValidator::new(config.max_file_size));
        let compressor = Arc::new(SizeTargetCompressor::new(Resampler::new(
            config.effective_resample_bands(),
        )));
        let semaphore = Arc::new(Semaphore::new(config.worker_count.max(1)));
        Self {
            config,
            validator,
            compressor,
            semaphore,
            gauge: Arc::new(Mutex::new(WorkerGauge::default())),
        }
    }

    /// Process a single submission, waiting for a free worker slot.
    pub async fn process(&self, submission: FileSubmission) -> WorkerResult<FileProcessingResult> {
        debug!("Acquiring worker slot for file: {}", submission.filename);
        let _permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        self.enter_worker(&submission.filename);

        let validator = Arc::clone(&self.validator);
        let compressor = Arc::clone(&self.compressor);
        let joined =
            tokio::task::spawn_blocking(move || run_pipeline(submission, &validator, &compressor))
                .await;
        self.exit_worker();
        joined.map_err(WorkerError::from)
    }

    /// Process a batch of submissions with at most `worker_count` pipelines
    /// running concurrently.
    ///
    /// Returns one result per input, in completion order. Every submission is
    /// observed to completion before this returns; a file's failure is
    /// collected, not propagated, unless `fail_fast` was configured.
    pub async fn process_batch(
        &self,
        submissions: Vec<FileSubmission>,
    ) -> WorkerResult<BatchSummary> {
        info!(
            "Processing batch of {} files with {} workers",
            submissions.len(),
            self.config.worker_count
        );

        let mut join_set = JoinSet::new();
        for submission in submissions {
            let pool = self.clone();
            join_set.spawn(async move { pool.process(submission).await });
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = join_set.join_next().await {
            let result = joined.map_err(WorkerError::from)??;
            let failed = !result.succeeded();
            if failed {
                warn!(
                    "File {} failed: {}",
                    result.filename,
                    result.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                );
            }
            summary.push(result);

            if failed && self.config.fail_fast {
                warn!("Fail-fast requested; aborting remaining submissions");
                join_set.abort_all();
                while join_set.join_next().await.is_some() {}
                break;
            }
        }

        info!(
            "Batch complete: {} succeeded, {} failed",
            summary.success_count(),
            summary.failure_count()
        );
        Ok(summary)
    }

    /// Files currently inside the decode/compress phase.
    pub fn active_workers(&self) -> usize {
        self.gauge.lock().map(|g| g.active).unwrap_or(0)
    }

    /// Highest concurrent worker count observed since construction.
    /// Never exceeds the configured limit.
    pub fn peak_workers(&self) -> usize {
        self.gauge.lock().map(|g| g.peak).unwrap_or(0)
    }

    fn enter_worker(&self, filename: &str) {
        if let Ok(mut gauge) = self.gauge.lock() {
            gauge.active += 1;
            gauge.peak = gauge.peak.max(gauge.active);
            debug!(
                "Worker started - Active: {}/{}, File: {}",
                gauge.active, self.config.worker_count, filename
            );
        }
    }

    fn exit_worker(&self) {
        if let Ok(mut gauge) = self.gauge.lock() {
            gauge.active = gauge.active.saturating_sub(1);
            debug!(
                "Worker finished - Active: {}/{}",
                gauge.active, self.config.worker_count
            );
        }
    }
}
