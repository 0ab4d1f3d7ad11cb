//! Contrast normalization stage
//!
//! Contrast-limited adaptive histogram equalization (CLAHE) applied to the
//! lightness channel of the Lab representation. Chrominance passes through
//! untouched so hue and saturation are preserved.
//!
//! The L plane is partitioned into a grid of tiles. Each tile gets a
//! histogram whose bins are clipped at `clip_limit` times the mean bin
//! count; the clipped mass is redistributed uniformly over all bins before
//! the equalization mapping is derived. Per-pixel output bilinearly
//! interpolates the mappings of the four surrounding tiles, clamping to the
//! nearest tile center at image borders.

use crate::bitmap::Bitmap;
use crate::color;
use crate::models::ClaheParams;
use crate::parallel::{parallel_for_each_row_mut, PARALLEL_THRESHOLD};

const HIST_BINS: usize = 256;

/// Apply CLAHE to the lightness channel of an RGB bitmap
///
/// Returns a new bitmap of identical dimensions. The input is never
/// mutated. Any positive dimensions are accepted; they need not be
/// multiples of the tile grid.
pub fn equalize_contrast(bitmap: &Bitmap, params: &ClaheParams) -> Bitmap {
    let width = bitmap.width as usize;
    let height = bitmap.height as usize;

    let mut planes = color::rgb_to_lab_planes(bitmap);
    planes.l = equalize_plane(&planes.l, width, height, params);
    color::lab_planes_to_rgb(&planes, bitmap.width, bitmap.height)
}

/// CLAHE over a single 8-bit plane
pub(crate) fn equalize_plane(
    plane: &[u8],
    width: usize,
    height: usize,
    params: &ClaheParams,
) -> Vec<u8> {
    // More tiles than pixels along an axis would leave empty tiles
    let tiles_x = (params.tile_grid.0 as usize).min(width).max(1);
    let tiles_y = (params.tile_grid.1 as usize).min(height).max(1);

    let luts = build_tile_luts(plane, width, height, tiles_x, tiles_y, params.clip_limit);

    // Tile centers are treated as uniformly spaced for interpolation; the
    // even partition below keeps actual centers within half a pixel of that.
    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    let mut out = plane.to_vec();
    parallel_for_each_row_mut(&mut out, width, PARALLEL_THRESHOLD, |y, row| {
        let ty = (y as f32 + 0.5) / tile_h - 0.5;
        let ty0 = ty.floor();
        let wy = ty - ty0;
        let iy0 = (ty0 as isize).clamp(0, tiles_y as isize - 1) as usize;
        let iy1 = (ty0 as isize + 1).clamp(0, tiles_y as isize - 1) as usize;

        for (x, value) in row.iter_mut().enumerate() {
            let tx = (x as f32 + 0.5) / tile_w - 0.5;
            let tx0 = tx.floor();
            let wx = tx - tx0;
            let ix0 = (tx0 as isize).clamp(0, tiles_x as isize - 1) as usize;
            let ix1 = (tx0 as isize + 1).clamp(0, tiles_x as isize - 1) as usize;

            let v = *value as usize;
            let top = lerp(
                luts[iy0 * tiles_x + ix0][v] as f32,
                luts[iy0 * tiles_x + ix1][v] as f32,
                wx,
            );
            let bottom = lerp(
                luts[iy1 * tiles_x + ix0][v] as f32,
                luts[iy1 * tiles_x + ix1][v] as f32,
                wx,
            );
            *value = lerp(top, bottom, wy).round().clamp(0.0, 255.0) as u8;
        }
    });

    out
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Build the equalization mapping for every tile
fn build_tile_luts(
    plane: &[u8],
    width: usize,
    height: usize,
    tiles_x: usize,
    tiles_y: usize,
    clip_limit: f32,
) -> Vec<[u8; HIST_BINS]> {
    let mut luts = Vec::with_capacity(tiles_x * tiles_y);

    for ty in 0..tiles_y {
        let y0 = ty * height / tiles_y;
        let y1 = (ty + 1) * height / tiles_y;

        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let x1 = (tx + 1) * width / tiles_x;

            let mut hist = [0u32; HIST_BINS];
            for y in y0..y1 {
                let row = &plane[y * width + x0..y * width + x1];
                for &v in row {
                    hist[v as usize] += 1;
                }
            }

            let area = (y1 - y0) * (x1 - x0);
            luts.push(tile_lut(&hist, area, clip_limit));
        }
    }

    luts
}

/// Clip a tile histogram, redistribute the excess, and derive the CDF-based
/// mapping
///
/// The clipped mass is spread as an equal fractional share per bin rather
/// than whole counts, so a flat field maps (near) onto itself regardless of
/// tile size.
fn tile_lut(hist: &[u32; HIST_BINS], area: usize, clip_limit: f32) -> [u8; HIST_BINS] {
    debug_assert!(area > 0);

    let clip = (clip_limit * area as f32 / HIST_BINS as f32).max(1.0);

    let mut clipped = [0.0f32; HIST_BINS];
    let mut excess = 0.0f32;
    for (dst, &count) in clipped.iter_mut().zip(hist.iter()) {
        let count = count as f32;
        if count > clip {
            excess += count - clip;
            *dst = clip;
        } else {
            *dst = count;
        }
    }

    let bonus = excess / HIST_BINS as f32;
    let scale = 255.0 / area as f32;

    let mut lut = [0u8; HIST_BINS];
    let mut cum = 0.0f32;
    for (dst, &count) in lut.iter_mut().zip(clipped.iter()) {
        cum += count + bonus;
        *dst = (cum * scale).round().clamp(0.0, 255.0) as u8;
    }

    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_shape_preserved() {
        let bitmap = testing::gradient(50, 37);
        let out = equalize_contrast(&bitmap, &ClaheParams::default());
        assert_eq!(out.width, 50);
        assert_eq!(out.height, 37);
        assert_eq!(out.channels, 3);
        assert_eq!(out.data.len(), bitmap.data.len());
    }

    #[test]
    fn test_flat_field_is_near_noop() {
        let bitmap = testing::uniform(100, 100, [128, 128, 128]);
        let out = equalize_contrast(&bitmap, &ClaheParams::default());

        for (orig, v) in bitmap.data.iter().zip(out.data.iter()) {
            let diff = (*orig as i32 - *v as i32).abs();
            assert!(diff <= 2, "flat field moved {} to {}", orig, v);
        }
    }

    #[test]
    fn test_low_contrast_input_gets_stretched() {
        // A narrow-range gradient should occupy a wider lightness range
        // after equalization
        let width = 64usize;
        let height = 64usize;
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for _ in 0..width {
                let v = 110 + (y * 36 / height) as u8; // 110..146
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let bitmap = Bitmap::from_rgb(width as u32, height as u32, data).unwrap();
        let out = equalize_contrast(&bitmap, &ClaheParams::default());

        let spread_in = spread(&bitmap.data);
        let spread_out = spread(&out.data);
        assert!(
            spread_out > spread_in,
            "expected wider range, got {} -> {}",
            spread_in,
            spread_out
        );
    }

    #[test]
    fn test_dimensions_not_multiple_of_grid() {
        // Partial tiles at the borders must not panic or change shape
        for (w, h) in [(13, 9), (101, 67), (8, 300)] {
            let bitmap = testing::gradient(w, h);
            let out = equalize_contrast(&bitmap, &ClaheParams::default());
            assert_eq!(out.data.len(), bitmap.data.len());
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let bitmap = testing::uniform(1, 1, [77, 77, 77]);
        let out = equalize_contrast(&bitmap, &ClaheParams::default());
        assert_eq!(out.pixel_count(), 1);
    }

    #[test]
    fn test_chroma_untouched_on_colored_flat_field() {
        // A flat colored field keeps its cast through this stage; only
        // lightness is remapped
        let bitmap = testing::uniform(64, 64, [180, 90, 60]);
        let planes_in = color::rgb_to_lab_planes(&bitmap);
        let out = equalize_contrast(&bitmap, &ClaheParams::default());
        let planes_out = color::rgb_to_lab_planes(&out);

        for (a_in, a_out) in planes_in.a.iter().zip(planes_out.a.iter()) {
            let diff = (*a_in as i32 - *a_out as i32).abs();
            assert!(diff <= 2, "chroma a moved {} to {}", a_in, a_out);
        }
    }

    fn spread(data: &[u8]) -> i32 {
        let min = *data.iter().min().unwrap() as i32;
        let max = *data.iter().max().unwrap() as i32;
        max - min
    }
}
