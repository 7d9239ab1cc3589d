//! Conversion pipeline: resize, optional edge preservation, palette
//! selection, then quantization or dithering.
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pixelize::pipeline::{convert, PaletteSource, PipelineConfig};
//!
//! let source = RgbaImage::from_pixel(64, 32, Rgba([200, 40, 40, 255]));
//! let config = PipelineConfig {
//!     target_width: 16,
//!     palette: PaletteSource::Generated { color_limit: 8 },
//!     ..Default::default()
//! };
//! let pixels = convert(&source, &config).unwrap();
//! assert_eq!(pixels.dimensions(), (16, 8));
//! ```

use std::ops::RangeInclusive;

use crate::buffer::{validate_dimensions, PixelBuffer};
use crate::edges::{preserve_edges, DEFAULT_EDGE_THRESHOLD};
use crate::error::PipelineError;
use crate::palette::{build_palette, Palette};
use crate::reduce::{dither, quantize};
use crate::resize::{resize, target_height};

/// Allowed output widths.
pub const TARGET_WIDTH_RANGE: RangeInclusive<u32> = 8..=256;

/// Allowed sizes for a generated palette.
pub const COLOR_LIMIT_RANGE: RangeInclusive<usize> = 2..=64;

/// Allowed edge thresholds (luma units).
///
/// Luma differences never exceed 255, so a larger threshold would never mark
/// an edge and is rejected instead.
pub const EDGE_THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=255.0;

/// Allowed dithering strengths.
pub const DITHER_STRENGTH_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Default dithering strength.
pub const DEFAULT_DITHER_STRENGTH: f64 = 0.3;

/// Where the palette for a conversion comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSource {
    /// Build one from the resized image with at most `color_limit` entries
    Generated { color_limit: usize },
    /// Use this palette as-is
    Supplied(Palette),
}

impl Default for PaletteSource {
    fn default() -> Self {
        PaletteSource::Generated { color_limit: 16 }
    }
}

/// Settings for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Output width in pixels (8-256)
    pub target_width: u32,
    /// Generated or supplied palette
    pub palette: PaletteSource,
    /// Use error diffusion instead of direct quantization
    pub dithering: bool,
    /// How much accumulated error feeds back (0.0-1.0)
    pub dither_strength: f64,
    /// Smooth non-edge pixels before palette selection
    pub preserve_edges: bool,
    /// Luma difference that marks an edge (0-255)
    pub edge_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: 64,
            palette: PaletteSource::default(),
            dithering: false,
            dither_strength: DEFAULT_DITHER_STRENGTH,
            preserve_edges: false,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Check every value against its documented range.
    ///
    /// Values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !TARGET_WIDTH_RANGE.contains(&self.target_width) {
            return Err(PipelineError::InvalidConfig(format!(
                "target width {} outside {}..={}",
                self.target_width,
                TARGET_WIDTH_RANGE.start(),
                TARGET_WIDTH_RANGE.end()
            )));
        }

        match &self.palette {
            PaletteSource::Generated { color_limit } => {
                if !COLOR_LIMIT_RANGE.contains(color_limit) {
                    return Err(PipelineError::InvalidConfig(format!(
                        "color limit {} outside {}..={}",
                        color_limit,
                        COLOR_LIMIT_RANGE.start(),
                        COLOR_LIMIT_RANGE.end()
                    )));
                }
            }
            PaletteSource::Supplied(palette) => {
                if palette.is_empty() {
                    return Err(PipelineError::InvalidPalette("palette is empty".to_string()));
                }
            }
        }

        if !EDGE_THRESHOLD_RANGE.contains(&self.edge_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "edge threshold {} outside 0..=255",
                self.edge_threshold
            )));
        }

        if !DITHER_STRENGTH_RANGE.contains(&self.dither_strength) {
            return Err(PipelineError::InvalidConfig(format!(
                "dither strength {} outside 0.0..=1.0",
                self.dither_strength
            )));
        }

        Ok(())
    }
}

/// Output of a conversion together with the palette it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub image: PixelBuffer,
    pub palette: Palette,
}

/// Validate, resize and optionally smooth `source`, then pick the palette.
///
/// All validation (config ranges, source and target dimensions, palette)
/// happens before any pixel is processed.
fn prepare(
    source: &PixelBuffer,
    config: &PipelineConfig,
) -> Result<(PixelBuffer, Palette), PipelineError> {
    config.validate()?;
    let (width, height) = source.dimensions();
    validate_dimensions(width, height)?;
    let out_height = target_height(width, height, config.target_width)?;

    tracing::debug!(target_width = config.target_width, target_height = out_height, "resizing");
    let mut working = resize(source, config.target_width)?;

    if config.preserve_edges {
        tracing::debug!(threshold = config.edge_threshold, "preserving edges");
        working = preserve_edges(&working, config.edge_threshold);
    }

    let palette = match &config.palette {
        PaletteSource::Generated { color_limit } => build_palette(&working, *color_limit)?,
        PaletteSource::Supplied(palette) => palette.clone(),
    };

    Ok((working, palette))
}

/// Run the full pipeline and keep the palette for reuse.
pub fn convert_detailed(
    source: &PixelBuffer,
    config: &PipelineConfig,
) -> Result<Conversion, PipelineError> {
    let (width, height) = source.dimensions();
    let _span = tracing::debug_span!("convert", width, height).entered();

    let (working, palette) = prepare(source, config)?;

    let image = if config.dithering {
        tracing::debug!(colors = palette.len(), strength = config.dither_strength, "dithering");
        dither(&working, &palette, config.dither_strength)
    } else {
        tracing::debug!(colors = palette.len(), "quantizing");
        quantize(&working, &palette)
    };

    Ok(Conversion { image, palette })
}

/// Palette that [`convert`] would use for `source`, without reducing colors.
///
/// Dithering settings are ignored.
pub fn extract_palette(source: &PixelBuffer, config: &PipelineConfig) -> Result<Palette, PipelineError> {
    let (width, height) = source.dimensions();
    let _span = tracing::debug_span!("extract_palette", width, height).entered();
    prepare(source, config).map(|(_, palette)| palette)
}

/// Convert `source` into pixel art according to `config`.
///
/// # Arguments
/// - `source` - Image to convert; both sides must be non-zero
/// - `config` - Target width, palette source and reduction settings
///
/// # Returns
/// - `Ok(PixelBuffer)` of `config.target_width` columns, every pixel a palette entry
/// - `Err(PipelineError)` if the config, source or target dimensions are invalid
pub fn convert(source: &PixelBuffer, config: &PipelineConfig) -> Result<PixelBuffer, PipelineError> {
    convert_detailed(source, config).map(|c| c.image)
}
