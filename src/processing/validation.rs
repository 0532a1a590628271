//! Input validation and decode, the first stage of every file's pipeline.

use crate::core::{DecodedImage, Dimensions, ProcessingOptions};
use crate::utils::{PipelineError, PipelineResult, detect_format};
use tracing::debug;

/// Validates raw upload bytes and decodes them into an owned pixel buffer.
///
/// Checks run cheapest-first so oversized or mislabeled uploads are rejected
/// before any decode work: byte ceiling, magic-byte sniffing, decode,
/// dimension ceiling. No side effects beyond the returned image.
pub struct ImageValidator {
    max_file_size: u64,
}

impl ImageValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn validate_and_decode(
        &self,
        bytes: &[u8],
        opts: &ProcessingOptions,
    ) -> PipelineResult<DecodedImage> {
        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return Err(PipelineError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        // Sniff the actual content type; the caller-declared type is never trusted.
        let format = detect_format(bytes)?;
        debug!("Detected format {:?} for {} byte upload", format, size);

        let decoded = image::load_from_memory_with_format(bytes, format.as_image_format())
            .map_err(|e| PipelineError::decode_failed(e.to_string()))?;

        let dimensions = Dimensions::new(decoded.width(), decoded.height());
        if dimensions.exceeds(opts.max_dimensions) {
            return Err(PipelineError::DimensionsExceeded {
                width: dimensions.width,
                height: dimensions.height,
                max_width: opts.max_dimensions.width,
                max_height: opts.max_dimensions.height,
            });
        }

        debug!("Decoded {} {:?} image", dimensions, format);
        Ok(DecodedImage::new(decoded.into_rgba8(), format))
    }
}
