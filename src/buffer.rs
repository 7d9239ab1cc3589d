//! Pixel buffer shared by every pipeline stage
//!
//! Stages take `&PixelBuffer` and return a freshly allocated buffer, so the
//! input is an immutable view and the output a disjoint one.

use image::{Rgba, RgbaImage};

use crate::error::PipelineError;

/// One RGBA sample, 8 bits per channel.
pub type Pixel = Rgba<u8>;

/// Row-major `width x height` RGBA raster.
pub type PixelBuffer = RgbaImage;

/// Offsets of the 8-connected neighborhood, row by row.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] =
    [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// Build a buffer from raw interleaved RGBA bytes.
///
/// Fails with `InvalidDimensions` if either side is zero or if `data` does not
/// hold exactly `width * height * 4` bytes.
pub fn from_raw_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<PixelBuffer, PipelineError> {
    validate_dimensions(width, height)?;
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(PipelineError::dimensions(width, height, "sample count does not match"));
    }
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| PipelineError::dimensions(width, height, "sample count does not match"))
}

/// Reject buffers with a zero-length side.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), PipelineError> {
    if width == 0 {
        return Err(PipelineError::dimensions(width, height, "width is zero"));
    }
    if height == 0 {
        return Err(PipelineError::dimensions(width, height, "height is zero"));
    }
    Ok(())
}

/// Iterate the in-bounds 8-connected neighbors of `(x, y)`.
///
/// Border pixels yield fewer than 8 neighbors; a 1x1 buffer yields none.
pub fn neighbors(buffer: &PixelBuffer, x: u32, y: u32) -> impl Iterator<Item = &Pixel> + '_ {
    let (width, height) = (buffer.width() as i64, buffer.height() as i64);
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx >= 0 && nx < width && ny >= 0 && ny < height {
            Some(buffer.get_pixel(nx as u32, ny as u32))
        } else {
            None
        }
    })
}
