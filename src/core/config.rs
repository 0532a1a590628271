//! Pipeline-wide configuration.
//!
//! An explicit dependency struct handed to the `WorkerPool` constructor; the
//! core keeps no process-wide mutable state.

/// Default number of concurrent per-file pipelines. A fixed constant rather
/// than a CPU-count derivation: the bound exists to cap memory from
/// simultaneously decoded images, not to saturate cores.
pub const DEFAULT_WORKERS: usize = 4;

/// Absolute per-file byte ceiling, enforced before any decode work.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Shared configuration for a [`WorkerPool`](crate::worker::WorkerPool).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of files in the decode/compress phase at once
    pub worker_count: usize,
    /// Hard input-size ceiling, distinct from any per-file target budget
    pub max_file_size: u64,
    /// Abort the batch on the first per-file error instead of collecting it
    pub fail_fast: bool,
    /// Row bands per resize; `None` uses available parallelism
    pub resample_bands: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            fail_fast: false,
            resample_bands: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_resample_bands(mut self, bands: usize) -> Self {
        self.resample_bands = Some(bands.max(1));
        self
    }

    /// Row bands to use for a resize, falling back to available parallelism.
    pub fn effective_resample_bands(&self) -> usize {
        self.resample_bands.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.worker_count, DEFAULT_WORKERS);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(!config.fail_fast);
    }

    #[test]
    fn builder_clamps_to_one() {
        let config = PipelineConfig::default()
            .with_worker_count(0)
            .with_resample_bands(0);
        assert_eq!(config.worker_count, 1);
        assert_eq!(config.effective_resample_bands(), 1);
    }
}
