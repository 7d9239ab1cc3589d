//! Edge-preserving smoothing
//!
//! A pixel whose luma differs from any single neighbor by more than the
//! threshold is an edge and passes through. Every other pixel becomes the
//! plain average of its neighbors. Neighbors are always read from the input
//! buffer, never from the output being written, so the result does not depend
//! on traversal order.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::buffer::{neighbors, Pixel, PixelBuffer};
use crate::color::{luma, to_channel};

/// Default luma difference above which a pixel counts as an edge.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 100.0;

/// True if `(x, y)` differs in luma from at least one neighbor by more than `threshold`.
pub fn is_edge_pixel(buffer: &PixelBuffer, x: u32, y: u32, threshold: f64) -> bool {
    let center = luma(buffer.get_pixel(x, y));
    neighbors(buffer, x, y).any(|n| (luma(n) - center).abs() > threshold)
}

/// Unweighted per-channel mean of the neighbors, alpha included.
///
/// `None` when the pixel has no in-bounds neighbor.
fn neighbor_average(buffer: &PixelBuffer, x: u32, y: u32) -> Option<Pixel> {
    let mut sums = [0u32; 4];
    let mut count = 0u32;
    for n in neighbors(buffer, x, y) {
        for (sum, &channel) in sums.iter_mut().zip(n.0.iter()) {
            *sum += channel as u32;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let mean = |sum: u32| to_channel(sum as f64 / count as f64);
    Some(Rgba([mean(sums[0]), mean(sums[1]), mean(sums[2]), mean(sums[3])]))
}

/// Smooth non-edge pixels while leaving edges untouched.
pub fn preserve_edges(buffer: &PixelBuffer, threshold: f64) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    out.par_chunks_mut(width as usize * 4).enumerate().for_each(|(y, row)| {
        let y = y as u32;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let x = x as u32;
            let source = buffer.get_pixel(x, y);
            let value = if is_edge_pixel(buffer, x, y, threshold) {
                *source
            } else {
                neighbor_average(buffer, x, y).unwrap_or(*source)
            };
            px.copy_from_slice(&value.0);
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Pixel = Rgba([0, 0, 0, 255]);
    const WHITE: Pixel = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_uniform_image_is_unchanged() {
        let src = RgbaImage::from_pixel(5, 4, Rgba([40, 80, 120, 255]));
        assert_eq!(preserve_edges(&src, DEFAULT_EDGE_THRESHOLD), src);
    }

    #[test]
    fn test_single_pixel_is_left_alone() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        assert_eq!(preserve_edges(&src, DEFAULT_EDGE_THRESHOLD), src);
    }

    #[test]
    fn test_hard_edge_survives() {
        // Left half black, right half white: luma jump of 255 > 100
        let src = RgbaImage::from_fn(4, 4, |x, _| if x < 2 { BLACK } else { WHITE });
        let out = preserve_edges(&src, DEFAULT_EDGE_THRESHOLD);
        for y in 0..4 {
            assert_eq!(*out.get_pixel(1, y), BLACK);
            assert_eq!(*out.get_pixel(2, y), WHITE);
        }
        // Far columns are not adjacent to the boundary and average to themselves
        assert_eq!(*out.get_pixel(0, 0), BLACK);
        assert_eq!(*out.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn test_soft_noise_is_averaged() {
        // Center differs by 30 luma, below threshold: replaced by neighbor mean
        let mut src = RgbaImage::from_pixel(3, 3, Rgba([100, 100, 100, 255]));
        src.put_pixel(1, 1, Rgba([130, 130, 130, 255]));
        let out = preserve_edges(&src, DEFAULT_EDGE_THRESHOLD);
        assert_eq!(*out.get_pixel(1, 1), Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn test_corner_average_uses_original_values() {
        // 2x2 with distinct soft values; every pixel averages its three neighbors
        // read from the input, not from already-smoothed output.
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        src.put_pixel(1, 0, Rgba([20, 20, 20, 255]));
        src.put_pixel(0, 1, Rgba([30, 30, 30, 255]));
        src.put_pixel(1, 1, Rgba([40, 40, 40, 255]));
        let out = preserve_edges(&src, DEFAULT_EDGE_THRESHOLD);
        assert_eq!(*out.get_pixel(0, 0), Rgba([30, 30, 30, 255])); // (20+30+40)/3
        assert_eq!(*out.get_pixel(1, 0), Rgba([27, 27, 27, 255])); // (10+30+40)/3 = 26.67
        assert_eq!(*out.get_pixel(0, 1), Rgba([23, 23, 23, 255])); // (10+20+40)/3 = 23.33
        assert_eq!(*out.get_pixel(1, 1), Rgba([20, 20, 20, 255])); // (10+20+30)/3
    }

    #[test]
    fn test_alpha_is_averaged() {
        let mut src = RgbaImage::from_pixel(3, 1, Rgba([50, 50, 50, 0]));
        src.put_pixel(1, 0, Rgba([50, 50, 50, 255]));
        let out = preserve_edges(&src, DEFAULT_EDGE_THRESHOLD);
        assert_eq!(out.get_pixel(1, 0)[3], 0);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_is_edge_pixel_threshold_is_strict() {
        let mut src = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([100, 100, 100, 255]));
        // Luma difference is 100 (within float error); strictly greater is required
        assert!(!is_edge_pixel(&src, 0, 0, 100.5));
        assert!(is_edge_pixel(&src, 0, 0, 99.5));
    }
}
