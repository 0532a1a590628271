//! Iterative quality/dimension search against a byte-size budget.

use crate::core::{
    CompressionAttempt, CompressionOutcome, DecodedImage, Dimensions, ProcessingOptions,
};
use crate::processing::Resampler;
use crate::utils::{ImageFormat, PipelineError, PipelineResult};
use image::buffer::ConvertBuffer;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::{debug, info};

/// Searches quality and dimensions until the encoded size fits the target.
///
/// Best effort under a quality floor and a 1x1 dimension minimum: when the
/// budget cannot be met the last encode is still returned, flagged
/// `unattainable`, and the caller decides whether to accept it.
#[derive(Debug, Clone)]
pub struct SizeTargetCompressor {
    resampler: Resampler,
}

impl SizeTargetCompressor {
    pub fn new(resampler: Resampler) -> Self {
        Self { resampler }
    }

    /// Run the size search for one decoded image.
    ///
    /// The loop is bounded by the quality steps between the starting quality
    /// and the floor; it terminates without relying on size convergence.
    pub fn compress(
        &self,
        image: &DecodedImage,
        opts: &ProcessingOptions,
    ) -> PipelineResult<CompressionOutcome> {
        let target = opts.target_size_bytes;
        let format = opts.output_format;
        let mut quality = opts.quality;
        let mut attempts = Vec::new();

        // Step 1: encode at the requested quality. Uploads that already fit
        // are the common case and skip all resize work.
        let mut encoded = encode_frame(image.pixels(), format, quality)?;
        attempts.push(CompressionAttempt {
            quality,
            dimensions: image.dimensions(),
            encoded_size: encoded.len() as u64,
        });
        if encoded.len() as u64 <= target {
            debug!(
                "Image already meets target size ({} <= {} bytes at quality {})",
                encoded.len(),
                target,
                quality
            );
            return Ok(CompressionOutcome {
                bytes: encoded,
                quality,
                dimensions: image.dimensions(),
                attempts,
                resized: false,
                unattainable: false,
            });
        }

        // Step 2: linear reduction ratio. Encoded size scales roughly with
        // pixel count, i.e. the square of linear dimension, at fixed quality,
        // so sqrt(target/current) approximates the dimension scale needed.
        let ratio = (target as f64 / encoded.len() as f64).sqrt();
        let new_dims = Dimensions::new(
            ((f64::from(image.width()) * ratio).round() as u32).max(1),
            ((f64::from(image.height()) * ratio).round() as u32).max(1),
        );
        debug!(
            "Resizing {} -> {} (ratio {:.4})",
            image.dimensions(),
            new_dims,
            ratio
        );
        let resized = self.resampler.resize(image.pixels(), new_dims);

        // Step 4: re-encode the resized image at the current quality.
        encoded = encode_frame(&resized, format, quality)?;
        attempts.push(CompressionAttempt {
            quality,
            dimensions: new_dims,
            encoded_size: encoded.len() as u64,
        });

        // Step 5: walk quality down to the floor, without re-resizing. PNG has
        // no quality knob, so its search ends with the resize.
        if format.has_quality() {
            while encoded.len() as u64 > target && quality > opts.quality_floor {
                quality = quality
                    .saturating_sub(opts.quality_step)
                    .max(opts.quality_floor);
                encoded = encode_frame(&resized, format, quality)?;
                attempts.push(CompressionAttempt {
                    quality,
                    dimensions: new_dims,
                    encoded_size: encoded.len() as u64,
                });
                debug!(
                    "Reduced quality to {} -> {} bytes (target {})",
                    quality,
                    encoded.len(),
                    target
                );
            }
        }

        let unattainable = encoded.len() as u64 > target;
        if unattainable {
            info!(
                "Target {} bytes unattainable; best effort {} bytes at quality {} ({})",
                target,
                encoded.len(),
                quality,
                new_dims
            );
        }
        Ok(CompressionOutcome {
            bytes: encoded,
            quality,
            dimensions: new_dims,
            attempts,
            resized: true,
            unattainable,
        })
    }
}

/// Encode one RGBA frame into the requested container.
fn encode_frame(pixels: &RgbaImage, format: ImageFormat, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::JPEG => {
            // JPEG carries no alpha; flatten to RGB for the encoder.
            let rgb: image::RgbImage = pixels.convert();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| PipelineError::encode_failed(e.to_string()))?;
        }
        ImageFormat::PNG => {
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(
                    pixels.as_raw(),
                    pixels.width(),
                    pixels.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| PipelineError::encode_failed(e.to_string()))?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageFormat;

    fn compressor() -> SizeTargetCompressor {
        SizeTargetCompressor::new(Resampler::new(2))
    }

    fn gradient_image(width: u32, height: u32) -> DecodedImage {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        DecodedImage::new(pixels, ImageFormat::JPEG)
    }

    /// Dense noise compresses poorly, forcing the search to work for it.
    fn noise_image(width: u32, height: u32) -> DecodedImage {
        let mut seed = 0x2545F491u32;
        let pixels = RgbaImage::from_fn(width, height, |_, _| {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            let b = seed.to_le_bytes();
            image::Rgba([b[0], b[1], b[2], 255])
        });
        DecodedImage::new(pixels, ImageFormat::JPEG)
    }

    #[test]
    fn short_circuits_when_original_fits() {
        let img = gradient_image(64, 64);
        let opts = ProcessingOptions {
            target_size_bytes: 1024 * 1024,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        assert_eq!(outcome.search_iterations(), 0);
        assert!(!outcome.resized);
        assert!(!outcome.unattainable);
        assert_eq!(outcome.quality, opts.quality);
        assert_eq!(outcome.dimensions, img.dimensions());
    }

    #[test]
    fn resizes_before_reducing_quality() {
        let img = noise_image(256, 256);
        let opts = ProcessingOptions {
            target_size_bytes: 6 * 1024,
            quality: 90,
            quality_floor: 65,
            quality_step: 5,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        assert!(outcome.resized);
        assert!(outcome.attempts.len() >= 2);
        // The second attempt is the post-resize encode at the *unchanged*
        // requested quality; quality only drops afterwards.
        let first = outcome.attempts[0];
        let second = outcome.attempts[1];
        assert_eq!(second.quality, 90);
        assert!(second.dimensions.width < first.dimensions.width);
        assert!(second.dimensions.height < first.dimensions.height);
        for pair in outcome.attempts[1..].windows(2) {
            assert_eq!(pair[0].dimensions, pair[1].dimensions);
            assert!(pair[1].quality <= pair[0].quality);
        }
    }

    #[test]
    fn meets_target_or_flags_unattainable() {
        let img = noise_image(200, 150);
        let opts = ProcessingOptions {
            target_size_bytes: 8 * 1024,
            quality: 85,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        assert!(outcome.quality >= opts.quality_floor && outcome.quality <= 100);
        assert!(outcome.dimensions.width >= 1 && outcome.dimensions.height >= 1);
        if !outcome.unattainable {
            assert!(outcome.encoded_size() <= opts.target_size_bytes);
        } else {
            assert_eq!(outcome.quality, opts.quality_floor);
        }
    }

    #[test]
    fn impossible_target_stops_at_floor() {
        let img = noise_image(96, 96);
        let opts = ProcessingOptions {
            // No JPEG of any dimensions fits in 16 bytes.
            target_size_bytes: 16,
            quality: 85,
            quality_floor: 65,
            quality_step: 5,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        assert!(outcome.unattainable);
        assert_eq!(outcome.quality, 65);
        assert!(outcome.dimensions.width >= 1 && outcome.dimensions.height >= 1);
        assert!(!outcome.bytes.is_empty());
        // Bounded by the quality ladder: initial + resize + floor descent.
        assert!(outcome.attempts.len() <= 2 + ((85 - 65) / 5) as usize);
    }

    #[test]
    fn tiny_ratio_clamps_dimensions_to_one() {
        let img = noise_image(64, 64);
        let opts = ProcessingOptions {
            target_size_bytes: 1,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        assert!(outcome.dimensions.width >= 1 && outcome.dimensions.height >= 1);
    }

    #[test]
    fn png_search_skips_quality_descent() {
        let img = noise_image(128, 128);
        let opts = ProcessingOptions {
            output_format: ImageFormat::PNG,
            target_size_bytes: 2 * 1024,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        // At most the initial encode and the post-resize encode.
        assert!(outcome.attempts.len() <= 2);
        assert_eq!(outcome.quality, opts.quality);
        assert!(outcome.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn jpeg_output_is_decodable() {
        let img = noise_image(150, 100);
        let opts = ProcessingOptions {
            target_size_bytes: 4 * 1024,
            ..Default::default()
        };
        let outcome = compressor().compress(&img, &opts).unwrap();
        let decoded = image::load_from_memory(&outcome.bytes).unwrap();
        assert_eq!(decoded.width(), outcome.dimensions.width);
        assert_eq!(decoded.height(), outcome.dimensions.height);
    }
}
