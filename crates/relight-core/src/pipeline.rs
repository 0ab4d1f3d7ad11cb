//! Correction pipeline orchestration
//!
//! Chains the three stages in fixed order: contrast normalization,
//! gray-world color balance, non-local-means denoising. The whole chain
//! either completes or fails fast on a malformed input; there is no partial
//! application of only some stages.

use crate::balance;
use crate::bitmap::Bitmap;
use crate::contrast;
use crate::denoise::{Denoiser, NlMeans};
use crate::models::CorrectionParams;

/// Run the full correction pipeline with the default denoiser
///
/// The input is never mutated; the returned bitmap has identical
/// dimensions. Deterministic for identical input bytes.
pub fn correct(bitmap: &Bitmap, params: &CorrectionParams) -> Result<Bitmap, String> {
    correct_with(bitmap, params, &NlMeans)
}

/// Run the full correction pipeline with a caller-supplied denoiser
pub fn correct_with(
    bitmap: &Bitmap,
    params: &CorrectionParams,
    denoiser: &dyn Denoiser,
) -> Result<Bitmap, String> {
    bitmap.validate_shape()?;
    let params = params.clone().sanitize();

    let mut corrected = contrast::equalize_contrast(bitmap, &params.clahe);
    log::debug!(
        "after contrast: means {:?}",
        balance::channel_means(&corrected.data)
    );

    let gains = balance::apply_gray_world(&mut corrected.data);
    log::debug!(
        "after balance: gains [{:.4}, {:.4}, {:.4}], means {:?}",
        gains[0],
        gains[1],
        gains[2],
        balance::channel_means(&corrected.data)
    );

    let corrected = denoiser.denoise(&corrected, &params.denoise);
    log::debug!(
        "after denoise: means {:?}",
        balance::channel_means(&corrected.data)
    );

    Ok(corrected)
}
