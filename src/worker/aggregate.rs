//! Fan-in of per-file outcomes into a single batch response.

use crate::core::FileProcessingResult;
use crate::utils::PipelineError;
use serde::Serialize;

/// Overall disposition of a batch, for the external layer to map onto a
/// response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    AllSucceeded,
    PartialFailure,
    TotalFailure,
}

/// Collected results of one batch, successes and failures side by side.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    results: Vec<FileProcessingResult>,
}

impl BatchSummary {
    pub fn push(&mut self, result: FileProcessingResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[FileProcessingResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<FileProcessingResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &FileProcessingResult> {
        self.results.iter().filter(|r| r.succeeded())
    }

    /// The failures, paired with their filenames.
    pub fn errors(&self) -> Vec<(&str, &PipelineError)> {
        self.results
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| (r.filename.as_str(), e)))
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.status() == BatchStatus::AllSucceeded
    }

    pub fn status(&self) -> BatchStatus {
        let failures = self.failure_count();
        if failures == 0 {
            BatchStatus::AllSucceeded
        } else if failures == self.results.len() {
            BatchStatus::TotalFailure
        } else {
            BatchStatus::PartialFailure
        }
    }
}
