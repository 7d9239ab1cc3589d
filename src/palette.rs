//! Palettes: the finalized color list, the hue-binned palette builder, and the
//! `[R,G,B]` text exchange format.
//!
//! # Palette construction
//!
//! A flat histogram lets one dominant hue starve rarer hues, so the builder
//! clusters in two levels:
//!
//! 1. every pixel goes into one of 12 equal hue bins (`floor(h * 12)`);
//! 2. inside a bin, a 4x4 grid over saturation x lightness accumulates RGB
//!    sums and pixel counts.
//!
//! Each non-empty cell becomes a candidate (mean RGB, weight = pixel count).
//! A bin keeps its `ceil(limit / 12)` heaviest cells, then all kept candidates
//! compete globally by weight and the list is cut to `limit`.
//!
//! Ties between equal weights resolve by ascending bin index, then ascending
//! cell index (`s_index * 4 + l_index`); both sorts are stable.
//!
//! # Text format
//!
//! ```
//! use pixelize::palette::{format_palette, parse_palette};
//!
//! let palette = parse_palette("[[0, 0, 0], [255, 0, 0]]").unwrap();
//! assert_eq!(palette.len(), 2);
//! assert_eq!(parse_palette(&format_palette(&palette)).unwrap(), palette);
//! ```

use image::Rgba;
use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::buffer::{validate_dimensions, PixelBuffer};
use crate::color::{color_distance, rgb_to_hsl};
use crate::error::PipelineError;

/// Number of equal-width hue partitions.
pub const HUE_BINS: usize = 12;

/// Grid resolution on each of the saturation and lightness axes.
pub const GRID_SIZE: usize = 4;

const CELLS_PER_BIN: usize = GRID_SIZE * GRID_SIZE;

// ============================================================================
// Palette
// ============================================================================

/// An ordered, non-empty list of opaque colors used as quantization targets.
///
/// Order matters: when two entries are equally close to a pixel, the earlier
/// one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Build a palette from RGB triples; alpha is fixed at 255.
    pub fn new(colors: Vec<[u8; 3]>) -> Result<Self, PipelineError> {
        if colors.is_empty() {
            return Err(PipelineError::InvalidPalette("palette is empty".to_string()));
        }
        Ok(Self { colors: colors.into_iter().map(|[r, g, b]| Rgba([r, g, b, 255])).collect() })
    }

    /// Palette entries in order.
    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    /// Entries as plain RGB triples.
    pub fn to_rgb(&self) -> Vec<[u8; 3]> {
        self.colors.iter().map(|c| [c[0], c[1], c[2]]).collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the entry closest to `color` under [`color_distance`].
    ///
    /// The first entry wins on ties.
    pub fn nearest_index(&self, color: [f64; 3]) -> usize {
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;
        for (i, c) in self.colors.iter().enumerate() {
            let dist = color_distance(color, [c[0] as f64, c[1] as f64, c[2] as f64]);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Entry closest to `color`.
    pub fn nearest(&self, color: [f64; 3]) -> Rgba<u8> {
        self.colors[self.nearest_index(color)]
    }
}

// ============================================================================
// Palette builder
// ============================================================================

/// A palette candidate: mean color of one grid cell and how many pixels fed it.
///
/// The weight only drives selection; it is dropped once the palette is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub rgb: [u8; 3],
    pub weight: u64,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    sum: [u64; 3],
    count: u64,
}

impl Cell {
    const EMPTY: Cell = Cell { sum: [0; 3], count: 0 };

    fn mean(&self) -> [u8; 3] {
        let half = self.count / 2;
        let avg = |s: u64| ((s + half) / self.count) as u8;
        [avg(self.sum[0]), avg(self.sum[1]), avg(self.sum[2])]
    }
}

/// Per-bin, per-cell running sums. Integer-only so partial histograms can be
/// merged in any order with identical results.
#[derive(Debug, Clone)]
struct HueHistogram {
    bins: [[Cell; CELLS_PER_BIN]; HUE_BINS],
}

impl HueHistogram {
    fn new() -> Self {
        Self { bins: [[Cell::EMPTY; CELLS_PER_BIN]; HUE_BINS] }
    }

    fn add(&mut self, r: u8, g: u8, b: u8) {
        let hsl = rgb_to_hsl(r, g, b);
        let bin = grid_index(hsl.h, HUE_BINS);
        let cell = grid_index(hsl.s, GRID_SIZE) * GRID_SIZE + grid_index(hsl.l, GRID_SIZE);

        let slot = &mut self.bins[bin][cell];
        slot.sum[0] += r as u64;
        slot.sum[1] += g as u64;
        slot.sum[2] += b as u64;
        slot.count += 1;
    }

    fn merge(mut self, other: HueHistogram) -> Self {
        for (bin, other_bin) in self.bins.iter_mut().zip(other.bins.iter()) {
            for (cell, other_cell) in bin.iter_mut().zip(other_bin.iter()) {
                for c in 0..3 {
                    cell.sum[c] += other_cell.sum[c];
                }
                cell.count += other_cell.count;
            }
        }
        self
    }
}

/// `floor(value * slots)` clamped into `0..slots`.
fn grid_index(value: f64, slots: usize) -> usize {
    let idx = (value * slots as f64).floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(slots - 1)
    }
}

fn histogram(buffer: &PixelBuffer) -> HueHistogram {
    buffer
        .par_chunks(buffer.width() as usize * 4)
        .fold(HueHistogram::new, |mut hist, row| {
            for px in row.chunks_exact(4) {
                hist.add(px[0], px[1], px[2]);
            }
            hist
        })
        .reduce(HueHistogram::new, HueHistogram::merge)
}

/// Weighted candidates in final order, before the weights are dropped.
///
/// Useful for inspecting how much of the image each entry represents.
pub fn palette_candidates(
    buffer: &PixelBuffer,
    color_limit: usize,
) -> Result<Vec<PaletteColor>, PipelineError> {
    validate_dimensions(buffer.width(), buffer.height())?;
    if color_limit == 0 {
        return Err(PipelineError::InvalidConfig("color limit must be at least 1".to_string()));
    }

    let hist = histogram(buffer);
    let per_bin = color_limit.div_ceil(HUE_BINS);

    let mut pooled = Vec::new();
    for bin in hist.bins.iter() {
        let mut cells: Vec<PaletteColor> = bin
            .iter()
            .filter(|cell| cell.count > 0)
            .map(|cell| PaletteColor { rgb: cell.mean(), weight: cell.count })
            .collect();
        // Stable: equal weights keep ascending cell order
        cells.sort_by(|a, b| b.weight.cmp(&a.weight));
        cells.truncate(per_bin);
        pooled.extend(cells);
    }

    // Stable: equal weights keep ascending bin order
    pooled.sort_by(|a, b| b.weight.cmp(&a.weight));
    pooled.truncate(color_limit);
    Ok(pooled)
}

/// Derive a palette of at most `color_limit` colors from `buffer`.
///
/// Never pads: an image with fewer occupied cells than `color_limit` gets a
/// smaller palette.
pub fn build_palette(buffer: &PixelBuffer, color_limit: usize) -> Result<Palette, PipelineError> {
    let candidates = palette_candidates(buffer, color_limit)?;
    tracing::debug!(
        requested = color_limit,
        built = candidates.len(),
        "palette built from hue bins"
    );
    Palette::new(candidates.into_iter().map(|c| c.rgb).collect())
}

// ============================================================================
// Text exchange format
// ============================================================================

/// Error while reading palette text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteParseError {
    /// Text is not valid JSON
    #[error("palette syntax error: {0}")]
    Syntax(String),
    /// Top level is not a list
    #[error("palette must be a list of [R,G,B] triples")]
    NotAList,
    /// List has no entries
    #[error("palette has no colors")]
    Empty,
    /// Entry is not a list of exactly three values
    #[error("entry {index} must be an [R,G,B] triple, found {found}")]
    WrongArity { index: usize, found: String },
    /// Channel is not an integer
    #[error("entry {index} has non-integer channel {value}")]
    NotAnInteger { index: usize, value: String },
    /// Channel is outside 0..=255
    #[error("entry {index} has channel {value} outside 0..=255")]
    OutOfRange { index: usize, value: String },
}

impl From<serde_json::Error> for PaletteParseError {
    fn from(e: serde_json::Error) -> Self {
        PaletteParseError::Syntax(e.to_string())
    }
}

impl From<PaletteParseError> for PipelineError {
    fn from(e: PaletteParseError) -> Self {
        PipelineError::InvalidPalette(e.to_string())
    }
}

fn parse_channel(index: usize, value: &Value) -> Result<u8, PaletteParseError> {
    let Some(n) = value.as_i64().or_else(|| value.as_u64().map(|_| i64::MAX)) else {
        return Err(PaletteParseError::NotAnInteger { index, value: value.to_string() });
    };
    u8::try_from(n).map_err(|_| PaletteParseError::OutOfRange { index, value: value.to_string() })
}

/// Parse `[[R,G,B], ...]` text into a palette.
pub fn parse_palette(text: &str) -> Result<Palette, PaletteParseError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(entries) = value else {
        return Err(PaletteParseError::NotAList);
    };
    if entries.is_empty() {
        return Err(PaletteParseError::Empty);
    }

    let mut colors = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let channels = match entry {
            Value::Array(channels) if channels.len() == 3 => channels,
            other => {
                return Err(PaletteParseError::WrongArity { index, found: other.to_string() })
            }
        };
        colors.push([
            parse_channel(index, &channels[0])?,
            parse_channel(index, &channels[1])?,
            parse_channel(index, &channels[2])?,
        ]);
    }

    Palette::new(colors).map_err(|_| PaletteParseError::Empty)
}

/// Write a palette as `[R,G,B]` text, one entry per line.
pub fn format_palette(palette: &Palette) -> String {
    let lines: Vec<String> = palette
        .colors()
        .iter()
        .map(|c| format!("  [{}, {}, {}]", c[0], c[1], c[2]))
        .collect();
    format!("[\n{}\n]\n", lines.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    /// Red-to-green sweep across columns with a varying blue component.
    fn rainbow(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let t = x as f64 / width as f64;
            let r = (t * 255.0) as u8;
            let g = ((1.0 - t) * 255.0) as u8;
            let b = ((y * 37 + x * 11) % 256) as u8;
            Rgba([r, g, b, 255])
        })
    }

    #[test]
    fn test_palette_new_rejects_empty() {
        assert!(matches!(Palette::new(Vec::new()), Err(PipelineError::InvalidPalette(_))));
    }

    #[test]
    fn test_palette_entries_are_opaque() {
        let palette = Palette::new(vec![[1, 2, 3]]).unwrap();
        assert_eq!(palette.colors(), &[Rgba([1, 2, 3, 255])]);
    }

    #[test]
    fn test_nearest_first_wins_on_tie() {
        let palette = Palette::new(vec![[10, 0, 0], [0, 0, 0], [10, 0, 0]]).unwrap();
        assert_eq!(palette.nearest_index([10.0, 0.0, 0.0]), 0);

        // Two candidates equidistant from the source: first listed wins
        let palette = Palette::new(vec![[0, 20, 0], [0, 0, 0], [0, 40, 0]]).unwrap();
        assert_eq!(palette.nearest_index([0.0, 30.0, 0.0]), 0);
    }

    #[test]
    fn test_nearest_near_black_prefers_black_over_red() {
        let palette = Palette::new(vec![[0, 0, 0], [255, 0, 0]]).unwrap();
        assert_eq!(palette.nearest([10.0, 10.0, 10.0]), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_grid_index_clamps() {
        assert_eq!(grid_index(0.0, 12), 0);
        assert_eq!(grid_index(0.999, 12), 11);
        assert_eq!(grid_index(1.0, 12), 11);
        assert_eq!(grid_index(1.0, 4), 3);
        assert_eq!(grid_index(0.26, 4), 1);
    }

    #[test]
    fn test_build_palette_single_color() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([200, 40, 40, 255]));
        let palette = build_palette(&img, 16).unwrap();
        assert_eq!(palette.to_rgb(), vec![[200, 40, 40]]);
    }

    #[test]
    fn test_build_palette_never_exceeds_limit() {
        let img = rainbow(64, 32);
        for limit in [1, 2, 5, 12, 13, 16, 32, 64] {
            let palette = build_palette(&img, limit).unwrap();
            assert!(palette.len() <= limit, "limit {} produced {}", limit, palette.len());
            assert!(!palette.is_empty());
        }
    }

    #[test]
    fn test_build_palette_is_not_padded() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 0, Rgba([255, 255, 0, 255]));
        let palette = build_palette(&img, 64).unwrap();
        assert_eq!(palette.len(), 2);
        // Heavier cell comes first
        assert_eq!(palette.to_rgb()[0], [0, 0, 255]);
    }

    #[test]
    fn test_build_palette_averages_within_cell() {
        // Two nearby reds share a bin and a cell
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([250, 10, 10, 255]));
        img.put_pixel(1, 0, Rgba([240, 20, 20, 255]));
        let palette = build_palette(&img, 4).unwrap();
        assert_eq!(palette.to_rgb(), vec![[245, 15, 15]]);
    }

    #[test]
    fn test_build_palette_rare_hue_survives() {
        // 95 green pixels in several shades and 5 red pixels: with a per-bin cap
        // of 1 cell, green cannot take every slot.
        let img = RgbaImage::from_fn(10, 10, |x, y| {
            if y == 0 && x < 5 {
                Rgba([220, 20, 20, 255])
            } else {
                Rgba([0, 60 + (x * 19) as u8, 0, 255])
            }
        });
        let palette = build_palette(&img, 2).unwrap();
        let rgb = palette.to_rgb();
        assert_eq!(rgb.len(), 2);
        assert!(rgb.iter().any(|c| c[0] > c[1]), "red missing from {:?}", rgb);
    }

    #[test]
    fn test_build_palette_tie_break_is_ascending_bin() {
        // One red pixel (bin 0) and one blue pixel (bin 8), equal weight
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let palette = build_palette(&img, 1).unwrap();
        assert_eq!(palette.to_rgb(), vec![[255, 0, 0]]);
    }

    #[test]
    fn test_build_palette_tie_break_is_ascending_cell() {
        // Both pixels land in bin 0 with weight 1: (255,0,0) in cell 14,
        // (128,0,0) in cell 13. The brighter one comes first in the image.
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([128, 0, 0, 255]));
        let palette = build_palette(&img, 1).unwrap();
        assert_eq!(palette.to_rgb(), vec![[128, 0, 0]]);

        let candidates = palette_candidates(&img, 12).unwrap();
        assert_eq!(candidates, vec![PaletteColor { rgb: [128, 0, 0], weight: 1 }]);
    }

    #[test]
    fn test_build_palette_is_deterministic() {
        let img = rainbow(40, 40);
        let a = build_palette(&img, 24).unwrap();
        let b = build_palette(&img, 24).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_palette_candidates_weights_descend() {
        let img = rainbow(48, 16);
        let candidates = palette_candidates(&img, 32).unwrap();
        assert!(candidates.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn test_build_palette_rejects_empty_image_and_zero_limit() {
        assert!(build_palette(&RgbaImage::new(0, 0), 4).is_err());
        assert!(build_palette(&RgbaImage::new(2, 2), 0).is_err());
    }

    #[test]
    fn test_parse_palette_accepts_whitespace() {
        let palette = parse_palette("[\n [0,0,0] ,\n\t[255, 0, 0]\n]").unwrap();
        assert_eq!(palette.to_rgb(), vec![[0, 0, 0], [255, 0, 0]]);
    }

    #[test]
    fn test_parse_palette_errors() {
        assert!(matches!(parse_palette("[[0,0,0"), Err(PaletteParseError::Syntax(_))));
        assert_eq!(parse_palette("{\"a\": 1}"), Err(PaletteParseError::NotAList));
        assert_eq!(parse_palette("[]"), Err(PaletteParseError::Empty));
        assert!(matches!(
            parse_palette("[[0,0]]"),
            Err(PaletteParseError::WrongArity { index: 0, .. })
        ));
        assert!(matches!(
            parse_palette("[[0,0,0],[1,2,3,4]]"),
            Err(PaletteParseError::WrongArity { index: 1, .. })
        ));
        assert!(matches!(
            parse_palette("[[0,\"x\",0]]"),
            Err(PaletteParseError::NotAnInteger { index: 0, .. })
        ));
        assert!(matches!(
            parse_palette("[[0,1.5,0]]"),
            Err(PaletteParseError::NotAnInteger { index: 0, .. })
        ));
        assert!(matches!(
            parse_palette("[[0,0,0],[0,0,256]]"),
            Err(PaletteParseError::OutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            parse_palette("[[-3,0,0]]"),
            Err(PaletteParseError::OutOfRange { index: 0, .. })
        ));
        assert!(matches!(
            parse_palette("[[18446744073709551615,0,0]]"),
            Err(PaletteParseError::OutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_error_converts_to_invalid_palette() {
        let err: PipelineError = PaletteParseError::Empty.into();
        assert_eq!(err, PipelineError::InvalidPalette("palette has no colors".to_string()));
    }

    #[test]
    fn test_format_palette_layout() {
        let palette = Palette::new(vec![[0, 0, 0], [255, 128, 1]]).unwrap();
        assert_eq!(format_palette(&palette), "[\n  [0, 0, 0],\n  [255, 128, 1]\n]\n");
    }
}
