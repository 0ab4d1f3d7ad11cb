//! On-disk configuration for correction parameters
//!
//! The pipeline itself takes an explicit `CorrectionParams` value; this
//! module only covers the optional YAML override file that front-ends load
//! defaults from. A missing file means built-in defaults, a malformed file
//! means defaults plus a warning.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::models::CorrectionParams;

/// Canonical list of candidate config file names searched in the working
/// directory
const CONFIG_FILENAMES: &[&str] = &["relight.yml", "relight.yaml"];

/// Loaded configuration together with its source path and any warnings
pub struct ConfigHandle {
    pub params: CorrectionParams,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

static CONFIG: OnceLock<ConfigHandle> = OnceLock::new();

/// Global configuration handle, loaded once on first access
pub fn config_handle() -> &'static ConfigHandle {
    CONFIG.get_or_init(load_default)
}

fn load_default() -> ConfigHandle {
    let mut warnings = Vec::new();

    for name in CONFIG_FILENAMES {
        let path = Path::new(name);
        if !path.is_file() {
            continue;
        }

        match load_params_from(path) {
            Ok(params) => {
                return ConfigHandle {
                    params,
                    source: Some(path.to_path_buf()),
                    warnings,
                };
            }
            Err(e) => {
                warnings.push(format!("Ignoring config {}: {}", path.display(), e));
            }
        }
    }

    ConfigHandle {
        params: CorrectionParams::default(),
        source: None,
        warnings,
    }
}

/// Load and sanitize correction parameters from a YAML file
pub fn load_params_from<P: AsRef<Path>>(path: P) -> Result<CorrectionParams, String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let params: CorrectionParams = serde_yaml::from_str(&text)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    Ok(params.sanitize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_params_from_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("relight_config_test.yml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "clahe:").unwrap();
        writeln!(file, "  clip_limit: 4.0").unwrap();
        writeln!(file, "denoise:").unwrap();
        writeln!(file, "  template_window: 6").unwrap();

        let params = load_params_from(&path).unwrap();
        assert_eq!(params.clahe.clip_limit, 4.0);
        // Sanitized to odd
        assert_eq!(params.denoise.template_window, 7);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_params_from("definitely/not/here.yml").unwrap_err();
        assert!(err.contains("Failed to read"), "unexpected error: {}", err);
    }
}
