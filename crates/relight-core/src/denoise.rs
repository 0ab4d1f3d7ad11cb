//! Denoising stage
//!
//! Non-local-means denoising of the gain-corrected bitmap. The filter runs
//! on the quantized Lab planes: the lightness plane with the luminance
//! strength, the two chrominance planes with the color strength, matching
//! the colored-denoise shape of the original pipeline.
//!
//! This is by far the most expensive stage (search window area times
//! template area per pixel), so it sits behind a strategy trait and callers
//! can substitute a cheaper filter without touching the rest of the
//! pipeline.

use crate::bitmap::Bitmap;
use crate::color;
use crate::models::DenoiseParams;
use crate::parallel::parallel_for_each_row_mut;

/// Per-pixel work is heavy enough that even small images benefit from rayon
const PARALLEL_MIN_PIXELS: usize = 4_096;

/// Replaceable denoising strategy
pub trait Denoiser {
    /// Produce a denoised copy of the bitmap; dimensions are preserved
    fn denoise(&self, bitmap: &Bitmap, params: &DenoiseParams) -> Bitmap;
}

/// Default non-local-means implementation
pub struct NlMeans;

impl Denoiser for NlMeans {
    fn denoise(&self, bitmap: &Bitmap, params: &DenoiseParams) -> Bitmap {
        let width = bitmap.width as usize;
        let height = bitmap.height as usize;

        let mut planes = color::rgb_to_lab_planes(bitmap);
        planes.l = nl_means_plane(
            &planes.l,
            width,
            height,
            params.luminance_strength,
            params.template_window as usize,
            params.search_window as usize,
        );
        planes.a = nl_means_plane(
            &planes.a,
            width,
            height,
            params.color_strength,
            params.template_window as usize,
            params.search_window as usize,
        );
        planes.b = nl_means_plane(
            &planes.b,
            width,
            height,
            params.color_strength,
            params.template_window as usize,
            params.search_window as usize,
        );
        color::lab_planes_to_rgb(&planes, bitmap.width, bitmap.height)
    }
}

/// Non-local-means over a single 8-bit plane
///
/// Each output pixel is the weighted average of search-window candidates,
/// weighted by patch similarity: `exp(-d2 / h^2)` with `d2` the mean
/// squared difference of the two template patches. Borders replicate the
/// edge pixel. A strength of zero disables the filter.
pub(crate) fn nl_means_plane(
    plane: &[u8],
    width: usize,
    height: usize,
    h: f32,
    template_window: usize,
    search_window: usize,
) -> Vec<u8> {
    if h <= 0.0 || plane.len() <= 1 {
        return plane.to_vec();
    }

    let half_t = (template_window / 2) as isize;
    let half_s = (search_window / 2) as isize;
    let inv_h2 = 1.0 / (h * h);
    let patch_len = (template_window * template_window) as f32;

    let clamp_x = |v: isize| v.clamp(0, width as isize - 1) as usize;
    let clamp_y = |v: isize| v.clamp(0, height as isize - 1) as usize;

    let mut out = vec![0u8; plane.len()];
    parallel_for_each_row_mut(&mut out, width, PARALLEL_MIN_PIXELS, |y, row| {
        let y = y as isize;
        for (x, dst) in row.iter_mut().enumerate() {
            let x = x as isize;
            let mut acc = 0.0f32;
            let mut weight_sum = 0.0f32;

            for dy in -half_s..=half_s {
                let cy = y + dy;
                for dx in -half_s..=half_s {
                    let cx = x + dx;

                    // Mean squared difference between the two patches
                    let mut d2 = 0.0f32;
                    for ty in -half_t..=half_t {
                        let ay = clamp_y(y + ty) * width;
                        let by = clamp_y(cy + ty) * width;
                        for tx in -half_t..=half_t {
                            let a = plane[ay + clamp_x(x + tx)] as f32;
                            let b = plane[by + clamp_x(cx + tx)] as f32;
                            let diff = a - b;
                            d2 += diff * diff;
                        }
                    }
                    d2 /= patch_len;

                    let w = (-d2 * inv_h2).exp();
                    weight_sum += w;
                    acc += w * plane[clamp_y(cy) * width + clamp_x(cx)] as f32;
                }
            }

            *dst = (acc / weight_sum).round().clamp(0.0, 255.0) as u8;
        }
    });

    out
}
