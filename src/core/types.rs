//! Core types for compression options, decoded images, and per-file results.

use crate::utils::{ImageFormat, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default encode quality for a fresh upload.
pub const DEFAULT_QUALITY: u8 = 85;
/// Lowest quality the size search will accept before giving up.
pub const DEFAULT_QUALITY_FLOOR: u8 = 65;
/// Quality decrement per search iteration.
pub const DEFAULT_QUALITY_STEP: u8 = 5;
/// Default byte budget for a processed image.
pub const DEFAULT_TARGET_SIZE_BYTES: u64 = 1024 * 1024;

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether either axis exceeds the given ceiling.
    pub fn exceeds(&self, ceiling: Dimensions) -> bool {
        self.width > ceiling.width || self.height > ceiling.height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Configuration for one file's compression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Target encode quality (1-100)
    pub quality: u8,
    /// Upper bound on encoded output size in bytes
    pub target_size_bytes: u64,
    /// Pixel-dimension ceiling enforced before any resize work
    pub max_dimensions: Dimensions,
    /// Output container format
    pub output_format: ImageFormat,
    /// Minimum quality the size search will accept
    pub quality_floor: u8,
    /// Quality decrement per search iteration
    pub quality_step: u8,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            target_size_bytes: DEFAULT_TARGET_SIZE_BYTES,
            max_dimensions: Dimensions::new(8000, 8000),
            output_format: ImageFormat::JPEG,
            quality_floor: DEFAULT_QUALITY_FLOOR,
            quality_step: DEFAULT_QUALITY_STEP,
        }
    }
}

impl ProcessingOptions {
    /// Check the option invariants: `quality_floor <= quality <= 100`,
    /// `target_size_bytes > 0`, a non-zero step, and a non-degenerate ceiling.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(PipelineError::invalid_options(format!(
                "quality {} out of range 1-100",
                self.quality
            )));
        }
        if self.quality_floor == 0 || self.quality_floor > self.quality {
            return Err(PipelineError::invalid_options(format!(
                "quality floor {} must be within 1..=quality ({})",
                self.quality_floor, self.quality
            )));
        }
        if self.quality_step == 0 {
            return Err(PipelineError::invalid_options(
                "quality step must be at least 1",
            ));
        }
        if self.target_size_bytes == 0 {
            return Err(PipelineError::invalid_options(
                "target size must be positive",
            ));
        }
        if self.max_dimensions.width == 0 || self.max_dimensions.height == 0 {
            return Err(PipelineError::invalid_options(format!(
                "max dimensions {} must be at least 1x1",
                self.max_dimensions
            )));
        }
        Ok(())
    }
}

/// An owned, immutable-after-decode pixel buffer.
///
/// Each worker owns its `DecodedImage` end-to-end; nothing here is shared for
/// mutation across workers.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: image::RgbaImage,
    source_format: ImageFormat,
}

impl DecodedImage {
    pub fn new(pixels: image::RgbaImage, source_format: ImageFormat) -> Self {
        Self {
            pixels,
            source_format,
        }
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// One iteration of the size search: what was encoded and how big it came out.
///
/// Transient; the sequence lives only inside a [`CompressionOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionAttempt {
    pub quality: u8,
    pub dimensions: Dimensions,
    pub encoded_size: u64,
}

/// Final product of the quality/dimension search for one image.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    /// Encoded output bytes
    pub bytes: Vec<u8>,
    /// Quality of the final encode
    pub quality: u8,
    /// Dimensions of the final encode
    pub dimensions: Dimensions,
    /// Every encode performed, in order
    pub attempts: Vec<CompressionAttempt>,
    /// Whether the search invoked the resampler
    pub resized: bool,
    /// The floor was reached with the result still over budget
    pub unattainable: bool,
}

impl CompressionOutcome {
    /// Search iterations beyond the initial encode. Zero means the original
    /// encoding already fit the target.
    pub fn search_iterations(&self) -> usize {
        self.attempts.len().saturating_sub(1)
    }

    pub fn encoded_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Result of processing a single file, created once per input and immutable
/// after the pipeline completes for that file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProcessingResult {
    pub filename: String,
    pub original_size: u64,
    pub final_size: u64,
    pub final_quality: u8,
    pub dimensions: Option<Dimensions>,
    /// Encoded output, handed to the caller by value. Not serialized; the
    /// external layer uploads the bytes and reports only the metadata.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub elapsed: Duration,
    pub error: Option<PipelineError>,
    /// Best-effort degradation report (`SizeUnattainable`), distinct from a
    /// hard error: the bytes above are still usable if the caller accepts them.
    pub warning: Option<PipelineError>,
}

impl FileProcessingResult {
    pub fn failed(filename: String, original_size: u64, elapsed: Duration, error: PipelineError) -> Self {
        Self {
            filename,
            original_size,
            final_size: 0,
            final_quality: 0,
            dimensions: None,
            bytes: Vec::new(),
            elapsed,
            error: Some(error),
            warning: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;

    #[test]
    fn default_options_are_valid() {
        ProcessingOptions::default().validate().unwrap();
    }

    #[test]
    fn rejects_floor_above_quality() {
        let opts = ProcessingOptions {
            quality: 50,
            quality_floor: 80,
            ..Default::default()
        };
        let err = opts.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }

    #[test]
    fn rejects_zero_target_and_zero_step() {
        let opts = ProcessingOptions {
            target_size_bytes: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());

        let opts = ProcessingOptions {
            quality_step: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn options_serialize_camel_case() {
        let json = serde_json::to_value(ProcessingOptions::default()).unwrap();
        assert_eq!(json["targetSizeBytes"], DEFAULT_TARGET_SIZE_BYTES);
        assert_eq!(json["qualityFloor"], DEFAULT_QUALITY_FLOOR);
        assert_eq!(json["outputFormat"], "jpeg");
    }

    #[test]
    fn dimensions_ceiling_check() {
        let ceiling = Dimensions::new(100, 100);
        assert!(Dimensions::new(101, 50).exceeds(ceiling));
        assert!(Dimensions::new(50, 101).exceeds(ceiling));
        assert!(!Dimensions::new(100, 100).exceeds(ceiling));
    }

    #[test]
    fn search_iterations_counts_past_first_encode() {
        let outcome = CompressionOutcome {
            bytes: vec![1, 2, 3],
            quality: 85,
            dimensions: Dimensions::new(10, 10),
            attempts: vec![CompressionAttempt {
                quality: 85,
                dimensions: Dimensions::new(10, 10),
                encoded_size: 3,
            }],
            resized: false,
            unattainable: false,
        };
        assert_eq!(outcome.search_iterations(), 0);
    }
}
