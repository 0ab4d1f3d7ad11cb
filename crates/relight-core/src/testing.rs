//! Synthetic bitmap generators and measurement helpers for tests
//!
//! Debug-only module; fixtures are deterministic (seeded RNG) so pipeline
//! output comparisons stay byte-stable across runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bitmap::Bitmap;

/// Uniform single-color bitmap
pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> Bitmap {
    Bitmap::filled(width, height, rgb).expect("valid test dimensions")
}

/// Gray horizontal-plus-vertical gradient covering a wide value range
pub fn gradient(width: u32, height: u32) -> Bitmap {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            let v = (((x + y) * 255) / (width + height - 1).max(1)) as u8;
            data.extend_from_slice(&[v, v, v]);
        }
    }
    Bitmap::from_rgb(width, height, data).expect("valid test dimensions")
}

/// Flat gray field plus independent per-sample noise in `[-amplitude, amplitude]`
pub fn noisy_gray(width: u32, height: u32, base: u8, amplitude: i32, seed: u64) -> Bitmap {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = width as usize * height as usize * 3;
    let mut data = Vec::with_capacity(count);
    for _ in 0..count {
        let v = base as i32 + rng.random_range(-amplitude..=amplitude);
        data.push(v.clamp(0, 255) as u8);
    }
    Bitmap::from_rgb(width, height, data).expect("valid test dimensions")
}

/// Mean of one channel (0 = R, 1 = G, 2 = B)
pub fn channel_mean(bitmap: &Bitmap, channel: usize) -> f64 {
    let samples: Vec<f64> = bitmap
        .data
        .chunks_exact(3)
        .map(|p| p[channel] as f64)
        .collect();
    mean(&samples)
}

/// Variance of one channel
pub fn channel_variance(bitmap: &Bitmap, channel: usize) -> f64 {
    let samples: Vec<f64> = bitmap
        .data
        .chunks_exact(3)
        .map(|p| p[channel] as f64)
        .collect();
    let m = mean(&samples);
    mean(&samples.iter().map(|v| (v - m) * (v - m)).collect::<Vec<_>>())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
