//! Pixelize - Library for turning raster images into pixel art
//!
//! This library provides functionality to:
//! - Resize images to a pixel-art width with nearest-neighbor sampling
//! - Smooth flat regions while keeping edges crisp
//! - Build a limited palette from an image, or use a supplied one
//! - Reduce colors directly or with Floyd-Steinberg dithering
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pixelize::{convert, palettes, PaletteSource, PipelineConfig};
//!
//! let photo = RgbaImage::from_pixel(128, 96, Rgba([90, 140, 200, 255]));
//! let config = PipelineConfig {
//!     target_width: 32,
//!     palette: PaletteSource::Supplied(palettes::get_builtin("pico8").unwrap()),
//!     dithering: true,
//!     ..Default::default()
//! };
//! let art = convert(&photo, &config).unwrap();
//! assert_eq!(art.dimensions(), (32, 24));
//! ```

pub mod buffer;
pub mod cli;
pub mod color;
pub mod config;
pub mod edges;
pub mod error;
pub mod output;
pub mod palette;
pub mod palettes;
pub mod pipeline;
pub mod reduce;
pub mod resize;

pub use buffer::{Pixel, PixelBuffer};
pub use error::PipelineError;
pub use palette::{build_palette, format_palette, parse_palette, Palette, PaletteParseError};
pub use pipeline::{
    convert, convert_detailed, extract_palette, Conversion, PaletteSource, PipelineConfig,
};
