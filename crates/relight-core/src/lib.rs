//! Relight Core Library
//!
//! Automatic brightness and color correction for photographs. The pipeline
//! runs three fixed stages on an in-memory RGB bitmap: contrast-limited
//! adaptive histogram equalization on the lightness channel, gray-world
//! color balance, and non-local-means denoising.

pub mod balance;
pub mod bitmap;
pub mod color;
pub mod config;
pub mod contrast;
pub mod denoise;
pub mod models;
pub mod pipeline;

mod parallel;

// Debug-only synthetic image helpers
#[cfg(debug_assertions)]
pub mod testing;

// Re-export commonly used types
pub use bitmap::Bitmap;
pub use color::Lab;
pub use denoise::{Denoiser, NlMeans};
pub use models::{ClaheParams, CorrectionParams, DenoiseParams};
pub use pipeline::{correct, correct_with};
