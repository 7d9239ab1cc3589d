//! Nearest-neighbor resampling to a target width
//!
//! No interpolation: every destination pixel is a copy of exactly one source
//! pixel, which keeps hard edges intact for the later stages.

use image::RgbaImage;
use rayon::prelude::*;

use crate::buffer::{validate_dimensions, PixelBuffer};
use crate::error::PipelineError;

/// Height that preserves the aspect ratio at `target_width`.
///
/// `round(height * target_width / width)`. Fails if any input side is zero,
/// the result rounds down to zero, or it does not fit in a `u32`.
pub fn target_height(width: u32, height: u32, target_width: u32) -> Result<u32, PipelineError> {
    validate_dimensions(width, height)?;
    if target_width == 0 {
        return Err(PipelineError::dimensions(target_width, height, "target width is zero"));
    }

    let scaled = (height as f64 * target_width as f64 / width as f64).round();
    if scaled < 1.0 {
        return Err(PipelineError::dimensions(target_width, 0, "target height rounds to zero"));
    }
    if scaled > u32::MAX as f64 {
        return Err(PipelineError::dimensions(target_width, height, "target height overflows"));
    }
    Ok(scaled as u32)
}

/// Resize `buffer` to `target_width`, preserving aspect ratio.
///
/// Destination `(x, y)` samples source
/// `(floor(x * width / target_width), floor(y * height / target_height))`.
pub fn resize(buffer: &PixelBuffer, target_width: u32) -> Result<PixelBuffer, PipelineError> {
    let (width, height) = buffer.dimensions();
    let target_h = target_height(width, height, target_width)?;

    let mut out = RgbaImage::new(target_width, target_h);
    let row_len = target_width as usize * 4;

    out.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let sy = (y as u64 * height as u64 / target_h as u64) as u32;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let sx = (x as u64 * width as u64 / target_width as u64) as u32;
            px.copy_from_slice(&buffer.get_pixel(sx, sy).0);
        }
    });

    Ok(out)
}
