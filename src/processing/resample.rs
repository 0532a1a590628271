//! Windowed-sinc (Lanczos) resampling, parallelized by row bands.
//!
//! Implemented from scratch rather than through a codec library so the
//! kernel, edge normalization, and banding behavior are fully under the
//! crate's control and byte-deterministic across runs.

use crate::core::Dimensions;
use image::RgbaImage;
use rayon::prelude::*;

/// Kernel support radius. Each output pixel samples a 7x7 source neighborhood.
const SUPPORT: f32 = 3.0;

/// The Lanczos-3 kernel: sinc(x) windowed by sinc(x/3) inside |x| < 3.
fn lanczos3(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        return 1.0;
    }
    if x.abs() >= SUPPORT {
        return 0.0;
    }
    let px = std::f32::consts::PI * x;
    SUPPORT * px.sin() * (px / SUPPORT).sin() / (px * px)
}

/// High-quality image resizer.
///
/// Produces output at exactly the requested dimensions; aspect-ratio decisions
/// and all size-budget logic belong to the caller.
#[derive(Debug, Clone)]
pub struct Resampler {
    bands: usize,
}

impl Resampler {
    /// `bands` is the number of contiguous row bands computed in parallel,
    /// normally one per available processing unit.
    pub fn new(bands: usize) -> Self {
        Self {
            bands: bands.max(1),
        }
    }

    /// Resize `src` to exactly `target`.
    ///
    /// Each band writes only the disjoint output region it owns; the result is
    /// assembled after all bands complete. Channel sums (alpha included) stay
    /// in f32 until the single clamped store per pixel.
    pub fn resize(&self, src: &RgbaImage, target: Dimensions) -> RgbaImage {
        let dst_w = target.width.max(1) as usize;
        let dst_h = target.height.max(1) as usize;
        let src_w = src.width() as usize;
        let src_h = src.height() as usize;

        let scale_x = src_w as f32 / dst_w as f32;
        let scale_y = src_h as f32 / dst_h as f32;

        let row_stride = dst_w * 4;
        let mut out = vec![0u8; dst_h * row_stride];
        let band_rows = dst_h.div_ceil(self.bands);

        out.par_chunks_mut(band_rows * row_stride)
            .enumerate()
            .for_each(|(band, chunk)| {
                let first_row = band * band_rows;
                for (row_offset, row) in chunk.chunks_exact_mut(row_stride).enumerate() {
                    let y = first_row + row_offset;
                    // Pixel-center mapping: output center (y+0.5) lands at
                    // source coordinate (y+0.5)*scale, expressed here relative
                    // to source pixel indices (centers at sy+0.5).
                    let src_cy = (y as f32 + 0.5) * scale_y - 0.5;
                    let iy = src_cy.floor() as i64;
                    for x in 0..dst_w {
                        let src_cx = (x as f32 + 0.5) * scale_x - 0.5;
                        let ix = src_cx.floor() as i64;

                        let mut acc = [0f32; 4];
                        let mut weight_sum = 0f32;
                        for sy in (iy - 3)..=(iy + 3) {
                            if sy < 0 || sy >= src_h as i64 {
                                continue;
                            }
                            let wy = lanczos3(src_cy - sy as f32);
                            if wy == 0.0 {
                                continue;
                            }
                            for sx in (ix - 3)..=(ix + 3) {
                                if sx < 0 || sx >= src_w as i64 {
                                    continue;
                                }
                                let w = wy * lanczos3(src_cx - sx as f32);
                                if w == 0.0 {
                                    continue;
                                }
                                let p = src.get_pixel(sx as u32, sy as u32).0;
                                acc[0] += w * p[0] as f32;
                                acc[1] += w * p[1] as f32;
                                acc[2] += w * p[2] as f32;
                                acc[3] += w * p[3] as f32;
                                weight_sum += w;
                            }
                        }

                        // Normalize by the weights actually sampled so pixels
                        // near the source boundary stay correctly scaled.
                        let out_px = &mut row[x * 4..x * 4 + 4];
                        if weight_sum > 0.0 {
                            for c in 0..4 {
                                out_px[c] = (acc[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
                            }
                        }
                    }
                }
            });

        RgbaImage::from_raw(dst_w as u32, dst_h as u32, out)
            .expect("output buffer sized from target dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn output_dimensions_are_exact() {
        let src = gradient(97, 61);
        let resampler = Resampler::new(4);
        let out = resampler.resize(&src, Dimensions::new(40, 23));
        assert_eq!((out.width(), out.height()), (40, 23));
    }

    #[test]
    fn degenerate_target_clamps_to_one_pixel() {
        let src = gradient(16, 16);
        let out = Resampler::new(2).resize(&src, Dimensions::new(0, 0));
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn resize_is_deterministic() {
        let src = gradient(128, 96);
        let resampler = Resampler::new(4);
        let a = resampler.resize(&src, Dimensions::new(50, 37));
        let b = resampler.resize(&src, Dimensions::new(50, 37));
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn band_count_does_not_change_pixels() {
        // Bands own disjoint regions; the split must be invisible in output.
        let src = gradient(64, 64);
        let one = Resampler::new(1).resize(&src, Dimensions::new(31, 29));
        let many = Resampler::new(7).resize(&src, Dimensions::new(31, 29));
        assert_eq!(one.as_raw(), many.as_raw());
    }

    #[test]
    fn flat_image_stays_flat() {
        // A constant field must survive resampling exactly: weights are
        // normalized, so any kernel mix of equal values is that value.
        let src = RgbaImage::from_pixel(80, 60, image::Rgba([120, 7, 201, 255]));
        let out = Resampler::new(3).resize(&src, Dimensions::new(33, 21));
        for px in out.pixels() {
            assert_eq!(px.0, [120, 7, 201, 255]);
        }
    }

    #[test]
    fn alpha_channel_is_resampled() {
        let src = RgbaImage::from_fn(40, 40, |x, _| image::Rgba([255, 0, 0, (x * 6) as u8]));
        let out = Resampler::new(2).resize(&src, Dimensions::new(20, 20));
        let left = out.get_pixel(1, 10).0[3];
        let right = out.get_pixel(18, 10).0[3];
        assert!(left < right, "alpha gradient lost: {left} !< {right}");
    }

    #[test]
    fn kernel_is_one_at_center_and_zero_outside_support() {
        assert!((lanczos3(0.0) - 1.0).abs() < 1e-6);
        assert_eq!(lanczos3(3.0), 0.0);
        assert_eq!(lanczos3(-4.5), 0.0);
        // Integer offsets inside the window are zero crossings of sinc.
        assert!(lanczos3(1.0).abs() < 1e-6);
        assert!(lanczos3(2.0).abs() < 1e-6);
    }
}
