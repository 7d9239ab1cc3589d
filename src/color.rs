//! Color-space utilities: RGB to HSL conversion, luma, and the weighted
//! color distance used for palette matching.
//!
//! All channel arithmetic happens in `f64`; values are only rounded and
//! clamped back to `u8` when a stage writes its output buffer.

use image::Rgba;

/// Channel weights shared by [`luma`] and [`color_distance`] (ITU-R BT.601).
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Multiplier applied when the candidate color is an achromatic non-black gray.
pub const GRAYSCALE_PENALTY: f64 = 1.5;

/// Hue, saturation and lightness, each normalized to `[0, 1]`.
///
/// Always derived from RGB; never used as the stored form of a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in `[0, 1)`
    pub h: f64,
    /// Saturation in `[0, 1]`
    pub s: f64,
    /// Lightness in `[0, 1]`
    pub l: f64,
}

/// Convert 8-bit RGB to HSL.
///
/// Fully desaturated input (`max == min`) yields `h = 0, s = 0`. A hue that
/// lands on exactly `1.0` after normalization wraps to `0.0`.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    let mut h = h / 6.0;
    if h >= 1.0 {
        h = 0.0;
    }

    Hsl { h, s, l }
}

/// Perceptual brightness of a pixel on the 0..=255 scale.
pub fn luma(pixel: &Rgba<u8>) -> f64 {
    LUMA_WEIGHTS[0] * pixel[0] as f64
        + LUMA_WEIGHTS[1] * pixel[1] as f64
        + LUMA_WEIGHTS[2] * pixel[2] as f64
}

/// True when all three channels are equal and the color is not pure black.
pub fn is_penalized_gray(color: [f64; 3]) -> bool {
    color[0] == color[1] && color[1] == color[2] && color[0] != 0.0
}

/// Weighted Euclidean distance from `source` to the palette `candidate`.
///
/// `sqrt(0.299*dr^2 + 0.587*dg^2 + 0.114*db^2)`, multiplied by
/// [`GRAYSCALE_PENALTY`] when the candidate is a non-black gray. Only the
/// candidate side is inspected, so the metric is not symmetric when exactly
/// one side is gray.
pub fn color_distance(source: [f64; 3], candidate: [f64; 3]) -> f64 {
    let dr = source[0] - candidate[0];
    let dg = source[1] - candidate[1];
    let db = source[2] - candidate[2];

    let distance =
        (LUMA_WEIGHTS[0] * dr * dr + LUMA_WEIGHTS[1] * dg * dg + LUMA_WEIGHTS[2] * db * db).sqrt();

    if is_penalized_gray(candidate) {
        distance * GRAYSCALE_PENALTY
    } else {
        distance
    }
}

/// RGB channels of a pixel as floats.
pub fn rgb_f64(pixel: &Rgba<u8>) -> [f64; 3] {
    [pixel[0] as f64, pixel[1] as f64, pixel[2] as f64]
}

/// Round and clamp a float channel into `u8`.
pub fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
