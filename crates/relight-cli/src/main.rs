//! Thin file-in/file-out front-end for the correction pipeline
//!
//! Decodes a photograph, runs the fixed correction chain, and writes the
//! result as PNG. All interesting work happens in relight-core.

use std::path::{Path, PathBuf};

use clap::Parser;
use relight_core::{config, correct, Bitmap};

#[derive(Parser)]
#[command(name = "relight")]
#[command(version, about = "Automatic brightness and color correction for photos", long_about = None)]
struct Cli {
    /// Input image (JPEG or PNG)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output path (defaults to <input>_corrected.png)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Correction parameters file (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let _logger = flexi_logger::Logger::try_with_env_or_str(level)
        .and_then(|l| l.start())
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        });

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let params = match &cli.config {
        Some(path) => config::load_params_from(path)?,
        None => {
            let handle = config::config_handle();
            for warning in &handle.warnings {
                log::warn!("{}", warning);
            }
            handle.params.clone()
        }
    };

    let bitmap = decode_image(&cli.input)?;
    log::info!(
        "Correcting {} ({}x{})",
        cli.input.display(),
        bitmap.width,
        bitmap.height
    );

    let corrected = correct(&bitmap, &params)?;

    let out_path = determine_output_path(&cli.input, cli.out.as_deref());
    encode_png(&corrected, &out_path)?;
    log::info!("Wrote {}", out_path.display());

    Ok(())
}

/// Decode an image file into an RGB bitmap
fn decode_image(path: &Path) -> Result<Bitmap, String> {
    let image = image::open(path).map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
    let rgb = image.to_rgb8();
    Bitmap::from_rgb(rgb.width(), rgb.height(), rgb.into_raw())
}

/// Encode a bitmap as PNG
fn encode_png(bitmap: &Bitmap, path: &Path) -> Result<(), String> {
    let buffer = image::RgbImage::from_raw(bitmap.width, bitmap.height, bitmap.data.clone())
        .ok_or_else(|| "Bitmap buffer does not match its dimensions".to_string())?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

/// Output path: explicit destination, or `<stem>_corrected.png` next to the
/// input
fn determine_output_path(input: &Path, out: Option<&Path>) -> PathBuf {
    if let Some(out) = out {
        return out.to_path_buf();
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_corrected.png", stem))
}
