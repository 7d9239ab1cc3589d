//! Built-in palette definitions.
//!
//! Provides a set of commonly used pixel art palettes that can be
//! referenced by name using the `@name` syntax wherever a palette file is
//! accepted. Entry order is significant: it decides ties during matching.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::palette::{parse_palette, Palette, PaletteParseError};

/// Failure to turn a palette reference into a [`Palette`].
#[derive(Debug, Error)]
pub enum PaletteLoadError {
    /// `@name` that is not a built-in
    #[error("unknown built-in palette '@{0}'")]
    UnknownBuiltin(String),
    /// Palette file could not be read
    #[error("failed to read palette '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Palette file content is malformed
    #[error("invalid palette '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: PaletteParseError,
    },
}

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["gameboy", "nes", "pico8", "grayscale", "1bit"];

/// Game Boy 4-color green palette.
/// Reference: https://lospec.com/palette-list/nintendo-gameboy-bgb
const GAMEBOY: &[[u8; 3]] = &[
    [0x0F, 0x38, 0x0F], // darkest
    [0x30, 0x62, 0x30], // dark
    [0x8B, 0xAC, 0x0F], // light
    [0x9B, 0xBC, 0x0F], // lightest
];

/// NES-inspired palette with key representative colors.
/// Reference: https://lospec.com/palette-list/nintendo-entertainment-system
const NES: &[[u8; 3]] = &[
    [0x00, 0x00, 0x00], // black
    [0xFC, 0xFC, 0xFC], // white
    [0xA8, 0x00, 0x20], // red
    [0x00, 0xA8, 0x00], // green
    [0x00, 0x58, 0xF8], // blue
    [0x00, 0xB8, 0xD8], // cyan
    [0xF8, 0xD8, 0x00], // yellow
    [0xF8, 0x38, 0x00], // orange
    [0xF8, 0x78, 0xF8], // pink
    [0x50, 0x30, 0x00], // brown
    [0x7C, 0x7C, 0x7C], // gray
    [0xFC, 0xB8, 0xB8], // skin
];

/// PICO-8 16-color palette, in the console's index order.
/// Reference: https://lospec.com/palette-list/pico-8
const PICO8: &[[u8; 3]] = &[
    [0x00, 0x00, 0x00],
    [0x1D, 0x2B, 0x53],
    [0x7E, 0x25, 0x53],
    [0x00, 0x87, 0x51],
    [0xAB, 0x52, 0x36],
    [0x5F, 0x57, 0x4F],
    [0xC2, 0xC3, 0xC7],
    [0xFF, 0xF1, 0xE8],
    [0xFF, 0x00, 0x4D],
    [0xFF, 0xA3, 0x00],
    [0xFF, 0xEC, 0x27],
    [0x00, 0xE4, 0x36],
    [0x29, 0xAD, 0xFF],
    [0x83, 0x76, 0x9C],
    [0xFF, 0x77, 0xA8],
    [0xFF, 0xCC, 0xAA],
];

/// 8-shade grayscale palette from white to black.
const GRAYSCALE: &[[u8; 3]] = &[
    [0xFF, 0xFF, 0xFF],
    [0xDF, 0xDF, 0xDF],
    [0xBF, 0xBF, 0xBF],
    [0x9F, 0x9F, 0x9F],
    [0x7F, 0x7F, 0x7F],
    [0x5F, 0x5F, 0x5F],
    [0x3F, 0x3F, 0x3F],
    [0x00, 0x00, 0x00],
];

/// 1-bit black and white palette.
const ONE_BIT: &[[u8; 3]] = &[[0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF]];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name, or None if not found.
pub fn get_builtin(name: &str) -> Option<Palette> {
    let colors = match name {
        "gameboy" => GAMEBOY,
        "nes" => NES,
        "pico8" => PICO8,
        "grayscale" => GRAYSCALE,
        "1bit" => ONE_BIT,
        _ => return None,
    };
    Palette::new(colors.to_vec()).ok()
}

/// Load a palette from an `@name` reference or a palette text file.
pub fn load_palette(reference: &str) -> Result<Palette, PaletteLoadError> {
    if let Some(name) = reference.strip_prefix('@') {
        return get_builtin(name).ok_or_else(|| PaletteLoadError::UnknownBuiltin(name.to_string()));
    }

    let path = Path::new(reference);
    let text = std::fs::read_to_string(path)
        .map_err(|source| PaletteLoadError::Io { path: path.to_path_buf(), source })?;
    parse_palette(&text).map_err(|source| PaletteLoadError::Parse { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_builtins() {
        let builtins = list_builtins();
        assert!(builtins.contains(&"gameboy"));
        assert!(builtins.contains(&"nes"));
        assert!(builtins.contains(&"pico8"));
        assert!(builtins.contains(&"grayscale"));
        assert!(builtins.contains(&"1bit"));
        assert_eq!(builtins.len(), 5);
    }

    #[test]
    fn test_get_builtin_gameboy() {
        let palette = get_builtin("gameboy").expect("gameboy palette should exist");
        assert_eq!(
            palette.to_rgb(),
            vec![[0x0F, 0x38, 0x0F], [0x30, 0x62, 0x30], [0x8B, 0xAC, 0x0F], [0x9B, 0xBC, 0x0F]]
        );
    }

    #[test]
    fn test_get_builtin_sizes() {
        assert_eq!(get_builtin("nes").map(|p| p.len()), Some(12));
        assert_eq!(get_builtin("pico8").map(|p| p.len()), Some(16));
        assert_eq!(get_builtin("grayscale").map(|p| p.len()), Some(8));
        assert_eq!(get_builtin("1bit").map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_get_builtin_pico8_order() {
        let palette = get_builtin("pico8").expect("pico8 palette should exist");
        let rgb = palette.to_rgb();
        assert_eq!(rgb[0], [0, 0, 0]);
        assert_eq!(rgb[7], [0xFF, 0xF1, 0xE8]);
    }

    #[test]
    fn test_get_builtin_nonexistent() {
        assert!(get_builtin("nonexistent").is_none());
        assert!(get_builtin("").is_none());
        assert!(get_builtin("Gameboy").is_none()); // case-sensitive
    }

    #[test]
    fn test_all_builtins_are_opaque() {
        for name in list_builtins() {
            let palette = get_builtin(name).expect("all listed builtins should exist");
            assert!(palette.colors().iter().all(|c| c[3] == 255), "{} has transparency", name);
        }
    }

    #[test]
    fn test_load_palette_builtin() {
        assert_eq!(load_palette("@pico8").unwrap(), get_builtin("pico8").unwrap());
        assert!(matches!(load_palette("@nope"), Err(PaletteLoadError::UnknownBuiltin(n)) if n == "nope"));
    }

    #[test]
    fn test_load_palette_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join("warm.txt");
        fs::write(&path, "[[255, 128, 0], [64, 0, 0]]").expect("should write palette");

        let palette = load_palette(path.to_str().unwrap()).unwrap();
        assert_eq!(palette.to_rgb(), vec![[255, 128, 0], [64, 0, 0]]);
    }

    #[test]
    fn test_load_palette_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let missing = temp.path().join("missing.txt");
        assert!(matches!(load_palette(missing.to_str().unwrap()), Err(PaletteLoadError::Io { .. })));

        let bad = temp.path().join("bad.txt");
        fs::write(&bad, "[[1, 2]]").expect("should write palette");
        assert!(matches!(load_palette(bad.to_str().unwrap()), Err(PaletteLoadError::Parse { .. })));
    }
}
