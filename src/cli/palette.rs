//! Palette command implementation

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{load_image, resolve_defaults, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::CliOverrides;
use crate::palette::{format_palette, parse_palette};
use crate::palettes;
use crate::pipeline::extract_palette;

/// Palette subcommands
#[derive(Subcommand, Debug)]
pub enum PaletteAction {
    /// Build a palette from an image and print it
    Extract {
        /// Input image
        input: PathBuf,

        /// Width the image is resized to before sampling (8-256, default: 64)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(8..=256))]
        width: Option<u32>,

        /// Maximum number of colors (2-64, default: 16)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(2..=64))]
        colors: Option<u64>,

        /// Smooth flat regions before sampling
        #[arg(short = 'e', long)]
        preserve_edges: bool,

        /// Luma difference that marks an edge (0-255, default: 100)
        #[arg(long)]
        edge_threshold: Option<f64>,

        /// Config file (default: nearest pixelize.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List all available built-in palettes
    List,
    /// Print a built-in palette
    Show {
        /// Name of the palette to show
        name: String,
    },
    /// Check that a palette file is well formed
    Check {
        /// Palette text file
        file: PathBuf,
    },
}

/// Execute a palette subcommand
pub fn run_palette(action: PaletteAction) -> ExitCode {
    match action {
        PaletteAction::Extract { input, width, colors, preserve_edges, edge_threshold, config } => {
            let overrides = CliOverrides {
                width,
                colors: colors.map(|c| c as usize),
                preserve_edges: preserve_edges.then_some(true),
                edge_threshold,
                ..Default::default()
            };
            run_extract(&input, config.as_deref(), &overrides)
        }
        PaletteAction::List => {
            println!("Built-in palettes:");
            for name in palettes::list_builtins() {
                let size = palettes::get_builtin(name).map(|p| p.len()).unwrap_or(0);
                println!("  @{} ({} colors)", name, size);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show { name } => {
            let palette_name = name.strip_prefix('@').unwrap_or(&name);
            match palettes::get_builtin(palette_name) {
                Some(palette) => {
                    print!("{}", format_palette(&palette));
                    ExitCode::from(EXIT_SUCCESS)
                }
                None => {
                    eprintln!("Error: Unknown palette '{}'", name);
                    eprintln!();
                    eprintln!("Available palettes:");
                    for builtin_name in palettes::list_builtins() {
                        eprintln!("  @{}", builtin_name);
                    }
                    ExitCode::from(EXIT_INVALID_ARGS)
                }
            }
        }
        PaletteAction::Check { file } => run_check(&file),
    }
}

/// Print the palette the convert command would generate for `input`.
///
/// A palette set in the config file is ignored; extraction always generates.
fn run_extract(input: &Path, config_path: Option<&Path>, overrides: &CliOverrides) -> ExitCode {
    let defaults = match resolve_defaults(config_path, overrides) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let source = match load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match extract_palette(&source, &defaults.pipeline_config(None)) {
        Ok(palette) => {
            print!("{}", format_palette(&palette));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run_check(file: &Path) -> ExitCode {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: Failed to read '{}': {}", file.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match parse_palette(&text) {
        Ok(palette) => {
            println!("{}: OK ({} colors)", file.display(), palette.len());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}: {}", file.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
