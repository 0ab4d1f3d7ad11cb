//! Correction parameters
//!
//! The stage constants used to be baked into the code paths; they are now an
//! explicit value passed into the pipeline entry point, with the documented
//! defaults. Parameters deserialize from YAML config files (see `config`).

use serde::{Deserialize, Serialize};

/// Full parameter set for one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorrectionParams {
    pub clahe: ClaheParams,
    pub denoise: DenoiseParams,
}

impl CorrectionParams {
    /// Clamp all parameters into their valid ranges
    pub fn sanitize(mut self) -> Self {
        self.clahe.sanitize();
        self.denoise.sanitize();
        self
    }
}

/// Contrast-limited adaptive histogram equalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    /// Histogram clip limit as a multiple of the mean bin count
    pub clip_limit: f32,

    /// Tile grid as (columns, rows)
    pub tile_grid: (u32, u32),
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

impl ClaheParams {
    fn sanitize(&mut self) {
        if !self.clip_limit.is_finite() {
            self.clip_limit = 2.0;
        }
        self.clip_limit = self.clip_limit.clamp(1.0, 40.0);
        self.tile_grid.0 = self.tile_grid.0.clamp(1, 256);
        self.tile_grid.1 = self.tile_grid.1.clamp(1, 256);
    }
}

/// Non-local-means denoising parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseParams {
    /// Filter strength for the lightness channel
    pub luminance_strength: f32,

    /// Filter strength for the chrominance channels
    pub color_strength: f32,

    /// Side length of the patch compared between pixels (odd)
    pub template_window: u32,

    /// Side length of the neighborhood searched per pixel (odd)
    pub search_window: u32,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            luminance_strength: 10.0,
            color_strength: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

impl DenoiseParams {
    fn sanitize(&mut self) {
        if !self.luminance_strength.is_finite() {
            self.luminance_strength = 10.0;
        }
        if !self.color_strength.is_finite() {
            self.color_strength = 10.0;
        }
        self.luminance_strength = self.luminance_strength.clamp(0.0, 100.0);
        self.color_strength = self.color_strength.clamp(0.0, 100.0);

        self.template_window = force_odd(self.template_window.clamp(1, 99));
        self.search_window = force_odd(self.search_window.clamp(1, 99));
        if self.search_window < self.template_window {
            self.search_window = self.template_window;
        }
    }
}

fn force_odd(v: u32) -> u32 {
    if v % 2 == 0 {
        v + 1
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let params = CorrectionParams::default();
        assert_eq!(params.clahe.clip_limit, 2.0);
        assert_eq!(params.clahe.tile_grid, (8, 8));
        assert_eq!(params.denoise.luminance_strength, 10.0);
        assert_eq!(params.denoise.color_strength, 10.0);
        assert_eq!(params.denoise.template_window, 7);
        assert_eq!(params.denoise.search_window, 21);
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut params = CorrectionParams::default();
        params.clahe.clip_limit = -5.0;
        params.clahe.tile_grid = (0, 1000);
        params.denoise.template_window = 8;
        params.denoise.search_window = 4;

        let params = params.sanitize();
        assert_eq!(params.clahe.clip_limit, 1.0);
        assert_eq!(params.clahe.tile_grid, (1, 256));
        // Windows become odd, search at least as large as template
        assert_eq!(params.denoise.template_window, 9);
        assert_eq!(params.denoise.search_window, 9);
    }

    #[test]
    fn test_partial_yaml_overlays_defaults() {
        let yaml = "clahe:\n  clip_limit: 3.5\n";
        let params: CorrectionParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.clahe.clip_limit, 3.5);
        assert_eq!(params.clahe.tile_grid, (8, 8));
        assert_eq!(params.denoise.search_window, 21);
    }
}
