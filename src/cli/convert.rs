//! Convert command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{load_image, resolve_defaults, resolve_palette, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::CliOverrides;
use crate::error::PipelineError;
use crate::output::{default_output_path, save_png, save_text, scale_image};
use crate::palette::format_palette;
use crate::pipeline::convert_detailed;

/// Execute the convert command
pub fn run_convert(
    input: &Path,
    output: Option<&Path>,
    save_palette: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> ExitCode {
    let defaults = match resolve_defaults(config_path, overrides) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let supplied = match defaults.palette.as_deref() {
        Some(reference) => match resolve_palette(reference) {
            Ok(palette) => Some(palette),
            Err(code) => return code,
        },
        None => None,
    };
    let config = defaults.pipeline_config(supplied);

    let source = match load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match convert_detailed(&source, &config) {
        Ok(r) => r,
        Err(e @ PipelineError::InvalidConfig(_)) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (width, height) = result.image.dimensions();
    let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output_path(input));
    let scaled = scale_image(result.image, defaults.scale);

    if let Err(e) = save_png(&scaled, &output_path) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    if let Some(palette_path) = save_palette {
        if let Err(e) = save_text(&format_palette(&result.palette), palette_path) {
            eprintln!("Error: Failed to write '{}': {}", palette_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    println!(
        "Converted: {} ({}x{}, {} colors)",
        output_path.display(),
        width,
        height,
        result.palette.len()
    );

    ExitCode::from(EXIT_SUCCESS)
}
