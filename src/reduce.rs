//! Color reduction: direct quantization and Floyd-Steinberg error diffusion
//!
//! Both modes write the chosen palette entry (opaque) for every pixel.

use image::RgbaImage;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::rgb_f64;
use crate::palette::Palette;

/// An error diffusion kernel.
///
/// Each entry is `(dx, dy, weight)`; a neighbor receives
/// `residual * weight / divisor`. Entries only point at pixels not yet
/// visited in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
}

/// Floyd-Steinberg kernel.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};

/// Accumulated RGB error per pixel, same shape as the image being dithered.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorGrid {
    width: u32,
    height: u32,
    errors: Vec<[f64; 3]>,
}

impl ErrorGrid {
    /// Zero-filled grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, errors: vec![[0.0; 3]; width as usize * height as usize] }
    }

    /// Grid width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Accumulated error at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [f64; 3] {
        self.errors[y as usize * self.width as usize + x as usize]
    }

    fn add(&mut self, x: u32, y: u32, amount: [f64; 3]) {
        let cell = &mut self.errors[y as usize * self.width as usize + x as usize];
        for c in 0..3 {
            cell[c] += amount[c];
        }
    }
}

/// Spread `residual` from `(x, y)` to its unvisited neighbors.
///
/// Targets outside the grid are skipped and their share is dropped; there is
/// no wraparound.
pub fn diffuse_error(grid: &mut ErrorGrid, kernel: &Kernel, x: u32, y: u32, residual: [f64; 3]) {
    let divisor = kernel.divisor as f64;
    for &(dx, dy, weight) in kernel.entries {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= grid.width() as i64 || ny >= grid.height() as i64 {
            continue;
        }
        let w = weight as f64 / divisor;
        grid.add(nx as u32, ny as u32, [residual[0] * w, residual[1] * w, residual[2] * w]);
    }
}

/// Replace every pixel with its nearest palette entry.
///
/// Pixels are independent, so rows are processed in parallel.
pub fn quantize(buffer: &PixelBuffer, palette: &Palette) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    out.par_chunks_mut(width as usize * 4)
        .zip(buffer.par_chunks(width as usize * 4))
        .for_each(|(out_row, src_row)| {
            for (dst, src) in out_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let color = palette.nearest([src[0] as f64, src[1] as f64, src[2] as f64]);
                dst.copy_from_slice(&color.0);
            }
        });

    out
}

/// Floyd-Steinberg error diffusion.
///
/// Pixels are visited strictly row-major. For each pixel the accumulated
/// error, scaled by `strength`, is added to the RGB value before matching; the
/// full residual `adjusted - chosen` is then diffused. `strength = 0.0`
/// reproduces [`quantize`] exactly; `1.0` is classic Floyd-Steinberg.
pub fn dither(buffer: &PixelBuffer, palette: &Palette, strength: f64) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let mut out = RgbaImage::new(width, height);
    let mut grid = ErrorGrid::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let original = rgb_f64(buffer.get_pixel(x, y));
            let error = grid.get(x, y);
            let adjusted = [
                original[0] + error[0] * strength,
                original[1] + error[1] * strength,
                original[2] + error[2] * strength,
            ];

            let chosen = palette.nearest(adjusted);
            out.put_pixel(x, y, chosen);

            let residual = [
                adjusted[0] - chosen[0] as f64,
                adjusted[1] - chosen[1] as f64,
                adjusted[2] - chosen[2] as f64,
            ];
            diffuse_error(&mut grid, &FLOYD_STEINBERG, x, y, residual);
        }
    }

    out
}
