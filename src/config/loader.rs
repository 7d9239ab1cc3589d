//! Configuration loading and discovery for `pixelize.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PixelizeConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up on disk
pub const CONFIG_FILE_NAME: &str = "pixelize.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pixelize.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output width
    pub width: Option<u32>,
    /// Override generated palette size
    pub colors: Option<usize>,
    /// Enable dithering
    pub dithering: Option<bool>,
    /// Override dithering strength
    pub dither_strength: Option<f64>,
    /// Enable edge preservation
    pub preserve_edges: Option<bool>,
    /// Override edge threshold
    pub edge_threshold: Option<f64>,
    /// Override export scale factor
    pub scale: Option<u32>,
    /// Override palette reference
    pub palette: Option<String>,
}

/// Find pixelize.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pixelize.toml
/// 2. Check XDG_CONFIG_HOME/pixelize/pixelize.toml (or ~/.config/pixelize/pixelize.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pixelize.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixelize").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find pixelize.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pixelize.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// built-in defaults.
///
/// # Arguments
/// - `path` - Optional path to a pixelize.toml file
///
/// # Returns
/// - `Ok(PixelizeConfig)` on success
/// - `Err(ConfigError)` if the file cannot be read, parsed or validated
///
/// # Example
/// ```ignore
/// let config = load_config(Some(Path::new("art/pixelize.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<PixelizeConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(PixelizeConfig::default()),
    }
}

/// Load configuration from a specific file path.
///
/// A relative palette file path is taken relative to the config file.
fn load_config_file(path: &Path) -> Result<PixelizeConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path)?;
    let mut config: PixelizeConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let (Some(root), Some(palette)) = (project_root(path), config.convert.palette.as_mut()) {
        if !palette.starts_with('@') {
            *palette = resolve_path(root, Path::new(palette.as_str())).to_string_lossy().into_owned();
        }
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PixelizeConfig, overrides: &CliOverrides) {
    let convert = &mut config.convert;

    if let Some(width) = overrides.width {
        convert.width = width;
    }
    if let Some(colors) = overrides.colors {
        convert.colors = colors;
    }
    if let Some(dithering) = overrides.dithering {
        convert.dithering = dithering;
    }
    if let Some(strength) = overrides.dither_strength {
        convert.dither_strength = strength;
    }
    if let Some(preserve) = overrides.preserve_edges {
        convert.preserve_edges = preserve;
    }
    if let Some(threshold) = overrides.edge_threshold {
        convert.edge_threshold = threshold;
    }
    if let Some(scale) = overrides.scale {
        convert.scale = scale;
    }
    if let Some(ref palette) = overrides.palette {
        convert.palette = Some(palette.clone());
    }
}

/// Directory containing the config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
