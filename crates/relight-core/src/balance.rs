//! Color balance stage (gray-world)
//!
//! Scales each channel so the per-channel means trend toward the grand mean
//! of all three, neutralizing color casts under the gray-world assumption.

use crate::parallel::{parallel_fold_reduce, parallel_for_each_chunk_mut};

/// Apply gray-world balance in place to interleaved RGB samples
///
/// Returns the per-channel gains that were applied. A channel whose mean is
/// zero keeps a neutral gain of 1.0 instead of dividing by zero; that holds
/// independently for every such channel, including a fully black image.
pub fn apply_gray_world(data: &mut [u8]) -> [f32; 3] {
    let means = channel_means(data);
    let gains = gray_world_gains(means);

    if gains != [1.0, 1.0, 1.0] {
        parallel_for_each_chunk_mut(data, 3, |_, pixel| {
            pixel[0] = scale_sample(pixel[0], gains[0]);
            pixel[1] = scale_sample(pixel[1], gains[1]);
            pixel[2] = scale_sample(pixel[2], gains[2]);
        });
    }

    gains
}

/// Arithmetic mean of each channel over the whole image
pub fn channel_means(data: &[u8]) -> [f32; 3] {
    let num_pixels = data.len() / 3;
    if num_pixels == 0 {
        return [0.0, 0.0, 0.0];
    }

    let (r_sum, g_sum, b_sum) = parallel_fold_reduce(
        data,
        3,
        || (0.0f64, 0.0f64, 0.0f64),
        |acc, pixel| {
            (
                acc.0 + pixel[0] as f64,
                acc.1 + pixel[1] as f64,
                acc.2 + pixel[2] as f64,
            )
        },
        |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2),
    );

    let count = num_pixels as f64;
    [
        (r_sum / count) as f32,
        (g_sum / count) as f32,
        (b_sum / count) as f32,
    ]
}

/// Per-channel gains that move the channel means onto their grand mean
fn gray_world_gains(means: [f32; 3]) -> [f32; 3] {
    let grand = (means[0] + means[1] + means[2]) / 3.0;

    let gain = |mean: f32| if mean > 0.0 { grand / mean } else { 1.0 };

    [gain(means[0]), gain(means[1]), gain(means[2])]
}

#[inline]
fn scale_sample(v: u8, gain: f32) -> u8 {
    (v as f32 * gain).clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_means_converge() {
        // Uniform cast: channels 200/100/50 must land on a common mean
        let mut bitmap = testing::uniform(40, 40, [200, 100, 50]);
        let gains = apply_gray_world(&mut bitmap.data);

        assert!(gains[0] < 1.0);
        assert!(gains[2] > 1.0);

        let means = channel_means(&bitmap.data);
        assert!(
            (means[0] - means[1]).abs() <= 1.0 && (means[1] - means[2]).abs() <= 1.0,
            "means did not converge: {:?}",
            means
        );
    }

    #[test]
    fn test_mixed_image_means_converge() {
        let mut bitmap = testing::noisy_gray(64, 64, 120, 40, 7);
        // Add a deliberate blue cast
        for pixel in bitmap.data.chunks_exact_mut(3) {
            pixel[2] = pixel[2].saturating_add(50);
        }
        apply_gray_world(&mut bitmap.data);

        let means = channel_means(&bitmap.data);
        assert!(
            (means[0] - means[2]).abs() <= 1.0,
            "means did not converge: {:?}",
            means
        );
    }

    #[test]
    fn test_neutral_gray_unchanged() {
        let mut bitmap = testing::uniform(10, 10, [128, 128, 128]);
        let original = bitmap.data.clone();
        let gains = apply_gray_world(&mut bitmap.data);

        assert_eq!(gains, [1.0, 1.0, 1.0]);
        assert_eq!(bitmap.data, original);
    }

    #[test]
    fn test_zero_mean_channel_gets_neutral_gain() {
        // Red entirely zero: no division error, red data untouched
        let mut bitmap = testing::uniform(20, 20, [0, 120, 60]);
        let gains = apply_gray_world(&mut bitmap.data);

        assert_eq!(gains[0], 1.0);
        for pixel in bitmap.data.chunks_exact(3) {
            assert_eq!(pixel[0], 0);
        }
    }

    #[test]
    fn test_fully_black_image_is_noop() {
        // Every channel mean is zero; all gains stay neutral
        let mut bitmap = testing::uniform(8, 8, [0, 0, 0]);
        let gains = apply_gray_world(&mut bitmap.data);

        assert_eq!(gains, [1.0, 1.0, 1.0]);
        assert!(bitmap.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_gains_clip_to_valid_range() {
        // Strong gain on a bright channel must clamp at 255, not wrap
        let mut bitmap = testing::uniform(4, 4, [250, 10, 10]);
        apply_gray_world(&mut bitmap.data);
        assert!(bitmap.data.iter().all(|&v| v <= 255));

        let means = channel_means(&bitmap.data);
        // Green and blue scaled up toward the grand mean
        assert!(means[1] > 10.0);
    }
}
