//! Error types for the compression pipeline.
//!
//! Every per-file failure is a [`PipelineError`], tagged by [`ErrorKind`] so
//! aggregation and external layers can branch on the category without parsing
//! messages.

use serde::Serialize;
use thiserror::Error;

/// Category tag for a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    FileTooLarge,
    InvalidFormat,
    DecodeFailed,
    DimensionsExceeded,
    EncodeFailed,
    SizeUnattainable,
    Io,
    InvalidOptions,
}

/// A failure in one file's pipeline.
///
/// Created at the point of failure and attached to exactly one
/// `FileProcessingResult`; never mutated afterwards.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PipelineError {
    /// Input exceeds the absolute byte ceiling (distinct from the target budget)
    #[error("file size {size} bytes exceeds maximum allowed size of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Leading bytes do not match any supported raster format
    #[error("unsupported or unrecognized image data: {reason}")]
    InvalidFormat { reason: String },

    /// The container matched a supported format but decoding failed
    #[error("failed to decode image: {reason}")]
    DecodeFailed { reason: String },

    /// Decoded dimensions exceed the configured ceiling
    #[error("image dimensions {width}x{height} exceed maximum allowed {max_width}x{max_height}")]
    DimensionsExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    /// Encoder rejected the frame
    #[error("failed to encode image: {reason}")]
    EncodeFailed { reason: String },

    /// The search hit the quality floor while still over budget.
    ///
    /// Reported alongside the best-effort bytes, not instead of them.
    #[error(
        "target size {target} bytes unattainable; best effort {achieved} bytes at quality {quality}"
    )]
    SizeUnattainable {
        target: u64,
        achieved: u64,
        quality: u8,
    },

    /// Read failure before any decode work
    #[error("IO error: {reason}")]
    Io { reason: String },

    /// ProcessingOptions violate their invariants
    #[error("invalid processing options: {reason}")]
    InvalidOptions { reason: String },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            Self::DimensionsExceeded { .. } => ErrorKind::DimensionsExceeded,
            Self::EncodeFailed { .. } => ErrorKind::EncodeFailed,
            Self::SizeUnattainable { .. } => ErrorKind::SizeUnattainable,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidOptions { .. } => ErrorKind::InvalidOptions,
        }
    }

    pub fn invalid_options<T: Into<String>>(msg: T) -> Self {
        Self::InvalidOptions { reason: msg.into() }
    }

    pub fn encode_failed<T: Into<String>>(msg: T) -> Self {
        Self::EncodeFailed { reason: msg.into() }
    }

    pub fn invalid_format<T: Into<String>>(msg: T) -> Self {
        Self::InvalidFormat { reason: msg.into() }
    }

    pub fn decode_failed<T: Into<String>>(msg: T) -> Self {
        Self::DecodeFailed { reason: msg.into() }
    }
}

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = PipelineError::FileTooLarge { size: 10, limit: 5 };
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
        assert_eq!(
            PipelineError::invalid_format("text/plain").kind(),
            ErrorKind::InvalidFormat
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let err = PipelineError::SizeUnattainable {
            target: 1024,
            achieved: 2048,
            quality: 65,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "sizeUnattainable");
        assert_eq!(json["target"], 1024);
        assert_eq!(json["quality"], 65);
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PipelineError = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
