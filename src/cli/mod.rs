//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod convert;
mod palette;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::buffer::PixelBuffer;
use crate::config::{load_config, merge_cli_overrides, CliOverrides, ConvertDefaults};
use crate::output::MAX_SCALE;
use crate::palette::Palette;
use crate::palettes::{self, PaletteLoadError};

pub use palette::PaletteAction;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixelize - Convert images into pixel art
#[derive(Parser)]
#[command(name = "pixelize")]
#[command(about = "Pixelize - Convert images into pixel art with a limited palette")]
#[command(version)]
pub struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an image to pixel art and write it as PNG
    Convert {
        /// Input image (any format the image decoder supports)
        input: PathBuf,

        /// Output PNG path (default: {input}_pixel.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output width in pixels (8-256, default: 64)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(8..=256))]
        width: Option<u32>,

        /// Number of colors in the generated palette (2-64, default: 16)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(2..=64))]
        colors: Option<u64>,

        /// Use Floyd-Steinberg dithering instead of direct quantization
        #[arg(short, long)]
        dither: bool,

        /// Dithering strength (0.0-1.0, default: 0.3)
        #[arg(long)]
        dither_strength: Option<f64>,

        /// Smooth flat regions while keeping edges
        #[arg(short = 'e', long)]
        preserve_edges: bool,

        /// Luma difference that marks an edge (0-255, default: 100)
        #[arg(long)]
        edge_threshold: Option<f64>,

        /// Palette file or built-in name (e.g., @pico8) instead of generating one
        #[arg(short, long)]
        palette: Option<String>,

        /// Scale the written PNG by an integer factor (1-32, default: 1)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_SCALE as i64))]
        scale: Option<u32>,

        /// Also write the palette used to this file
        #[arg(long)]
        save_palette: Option<PathBuf>,

        /// Config file (default: nearest pixelize.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Palette tools
    Palette {
        #[command(subcommand)]
        action: PaletteAction,
    },
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pixelize=debug" } else { "pixelize=warn" };
    // A second init (e.g. when run() is called twice in one process) is ignored
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .try_init();
}

/// Decode an image file into an RGBA buffer.
pub(crate) fn load_image(path: &Path) -> Result<PixelBuffer, String> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

/// Load the config file and apply CLI overrides, reporting failures.
///
/// Returns the exit code to use on failure.
pub(crate) fn resolve_defaults(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<ConvertDefaults, ExitCode> {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };
    merge_cli_overrides(&mut config, overrides);

    let errors = config.convert.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: invalid value for '{}': {}", error.field, error.message);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }

    Ok(config.convert)
}

/// Resolve a palette reference, reporting failures.
pub(crate) fn resolve_palette(reference: &str) -> Result<Palette, ExitCode> {
    match palettes::load_palette(reference) {
        Ok(palette) => Ok(palette),
        Err(e @ PaletteLoadError::UnknownBuiltin(_)) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Available palettes:");
            for name in palettes::list_builtins() {
                eprintln!("  @{}", name);
            }
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            width,
            colors,
            dither,
            dither_strength,
            preserve_edges,
            edge_threshold,
            palette,
            scale,
            save_palette,
            config,
        } => {
            let overrides = CliOverrides {
                width,
                colors: colors.map(|c| c as usize),
                dithering: dither.then_some(true),
                dither_strength,
                preserve_edges: preserve_edges.then_some(true),
                edge_threshold,
                scale,
                palette,
            };
            convert::run_convert(
                &input,
                output.as_deref(),
                save_palette.as_deref(),
                config.as_deref(),
                &overrides,
            )
        }
        Commands::Palette { action } => palette::run_palette(action),
    }
}
