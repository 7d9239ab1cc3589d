//! Configuration schema types for `pixelize.toml`
//!
//! Defines the structure and validation rules for conversion defaults.

use serde::{Deserialize, Serialize};

use crate::edges::DEFAULT_EDGE_THRESHOLD;
use crate::output::MAX_SCALE;
use crate::palette::Palette;
use crate::pipeline::{
    PaletteSource, PipelineConfig, COLOR_LIMIT_RANGE, DEFAULT_DITHER_STRENGTH,
    DITHER_STRENGTH_RANGE, EDGE_THRESHOLD_RANGE, TARGET_WIDTH_RANGE,
};

/// Root of a `pixelize.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelizeConfig {
    /// Defaults for `pixelize convert`
    #[serde(default)]
    pub convert: ConvertDefaults,
}

/// The `[convert]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertDefaults {
    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Size of a generated palette
    #[serde(default = "default_colors")]
    pub colors: usize,
    /// Use error diffusion
    #[serde(default)]
    pub dithering: bool,
    /// Error diffusion strength
    #[serde(default = "default_dither_strength")]
    pub dither_strength: f64,
    /// Smooth non-edge pixels
    #[serde(default)]
    pub preserve_edges: bool,
    /// Luma difference that marks an edge
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,
    /// Integer upscale applied when writing the PNG
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Built-in `@name` or path to a palette text file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
}

impl Default for ConvertDefaults {
    fn default() -> Self {
        Self {
            width: default_width(),
            colors: default_colors(),
            dithering: false,
            dither_strength: default_dither_strength(),
            preserve_edges: false,
            edge_threshold: default_edge_threshold(),
            scale: default_scale(),
            palette: None,
        }
    }
}

fn default_width() -> u32 {
    64
}

fn default_colors() -> usize {
    16
}

fn default_dither_strength() -> f64 {
    DEFAULT_DITHER_STRENGTH
}

fn default_edge_threshold() -> f64 {
    DEFAULT_EDGE_THRESHOLD
}

fn default_scale() -> u32 {
    1
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "convert.width")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pixelize.toml: '{}' {}", self.field, self.message)
    }
}

impl PixelizeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        self.convert.validate()
    }
}

impl ConvertDefaults {
    /// Validate every field against its allowed range.
    ///
    /// `colors` only bounds a generated palette, so it is not checked when a
    /// palette is supplied.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: format!("convert.{}", field), message });
        };

        if !TARGET_WIDTH_RANGE.contains(&self.width) {
            fail(
                "width",
                format!(
                    "must be between {} and {}",
                    TARGET_WIDTH_RANGE.start(),
                    TARGET_WIDTH_RANGE.end()
                ),
            );
        }

        if self.palette.is_none() && !COLOR_LIMIT_RANGE.contains(&self.colors) {
            fail(
                "colors",
                format!(
                    "must be between {} and {}",
                    COLOR_LIMIT_RANGE.start(),
                    COLOR_LIMIT_RANGE.end()
                ),
            );
        }

        if !DITHER_STRENGTH_RANGE.contains(&self.dither_strength) {
            fail("dither_strength", "must be between 0.0 and 1.0".to_string());
        }

        if !EDGE_THRESHOLD_RANGE.contains(&self.edge_threshold) {
            fail("edge_threshold", "must be between 0.0 and 255.0".to_string());
        }

        if !(1..=MAX_SCALE).contains(&self.scale) {
            fail("scale", format!("must be between 1 and {}", MAX_SCALE));
        }

        if let Some(palette) = &self.palette {
            if palette.trim().is_empty() {
                fail("palette", "must be a non-empty string".to_string());
            }
        }

        errors
    }

    /// Build the pipeline settings these defaults describe.
    ///
    /// A supplied palette replaces palette generation and `colors` is ignored.
    pub fn pipeline_config(&self, supplied: Option<Palette>) -> PipelineConfig {
        let palette = match supplied {
            Some(palette) => PaletteSource::Supplied(palette),
            None => PaletteSource::Generated { color_limit: self.colors },
        };
        PipelineConfig {
            target_width: self.width,
            palette,
            dithering: self.dithering,
            dither_strength: self.dither_strength,
            preserve_edges: self.preserve_edges,
            edge_threshold: self.edge_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: PixelizeConfig = toml::from_str("").unwrap();
        assert_eq!(config, PixelizeConfig::default());
        assert_eq!(config.convert.width, 64);
        assert_eq!(config.convert.colors, 16);
        assert_eq!(config.convert.dither_strength, 0.3);
        assert_eq!(config.convert.edge_threshold, 100.0);
        assert_eq!(config.convert.scale, 1);
        assert!(config.convert.palette.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_section() {
        let config: PixelizeConfig = toml::from_str(
            r#"
[convert]
width = 32
dithering = true
palette = "@gameboy"
"#,
        )
        .unwrap();
        assert_eq!(config.convert.width, 32);
        assert!(config.convert.dithering);
        assert_eq!(config.convert.colors, 16);
        assert_eq!(config.convert.palette.as_deref(), Some("@gameboy"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ConvertDefaults {
            width: 4,
            colors: 100,
            dither_strength: 2.0,
            edge_threshold: -5.0,
            scale: 0,
            ..Default::default()
        };
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "convert.width",
                "convert.colors",
                "convert.dither_strength",
                "convert.edge_threshold",
                "convert.scale",
            ]
        );
    }

    #[test]
    fn test_validate_ignores_colors_when_palette_supplied() {
        let config = ConvertDefaults {
            colors: 500,
            palette: Some("@gameboy".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_empty());

        let config =
            ConvertDefaults { colors: 500, palette: Some(" ".to_string()), ..Default::default() };
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["convert.palette"]);
    }

    #[test]
    fn test_pipeline_config_from_defaults() {
        let defaults = ConvertDefaults { width: 48, colors: 8, dithering: true, ..Default::default() };
        let config = defaults.pipeline_config(None);
        assert_eq!(config.target_width, 48);
        assert_eq!(config.palette, PaletteSource::Generated { color_limit: 8 });
        assert!(config.dithering);
        assert_eq!(config.validate(), Ok(()));

        let palette = Palette::new(vec![[0, 0, 0], [255, 255, 255]]).unwrap();
        let config = defaults.pipeline_config(Some(palette.clone()));
        assert_eq!(config.palette, PaletteSource::Supplied(palette));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "convert.width".to_string(),
            message: "must be between 8 and 256".to_string(),
        };
        assert_eq!(err.to_string(), "pixelize.toml: 'convert.width' must be between 8 and 256");
    }
}
