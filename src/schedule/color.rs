// src/schedule/color.rs

use super::ShirtColor;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// An 8-bit sRGB color, as painted into a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from PDF color components in `0.0..=1.0`.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn from_gray(level: f64) -> Self {
        Self::from_unit(level, level, level)
    }

    /// Naive CMYK conversion, good enough for flat table fills.
    pub fn from_cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self::from_unit(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )
    }

    /// Euclidean distance across the three channels.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected a #RRGGBB color, got {s:?}"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reference swatches and the tolerance used to classify cell fills.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSettings {
    pub azul: Rgb,
    pub blanco: Rgb,
    /// Fill that means "no explicit fill". Such cells are never matches.
    pub background: Rgb,
    /// Fills farther than this from both swatches are not match cells.
    pub max_distance: f64,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            azul: Rgb::new(0x9D, 0xC3, 0xE6),
            blanco: Rgb::new(0xF2, 0xF2, 0xF2),
            background: Rgb::new(0xFF, 0xFF, 0xFF),
            max_distance: 60.0,
        }
    }
}

/// Maps a cell's fill color to the shirt color the team wears.
#[derive(Debug, Clone)]
pub struct CellClassifier {
    settings: ColorSettings,
}

impl CellClassifier {
    pub fn new(settings: ColorSettings) -> Self {
        Self { settings }
    }

    /// True when the cell carries no fill of its own.
    pub fn is_background(&self, fill: Option<Rgb>) -> bool {
        match fill {
            None => true,
            Some(color) => color == self.settings.background,
        }
    }

    /// Nearest reference swatch, or `None` when neither is close enough.
    /// Equidistant fills resolve to azul.
    pub fn classify(&self, fill: Rgb) -> Option<ShirtColor> {
        let to_azul = fill.distance(&self.settings.azul);
        let to_blanco = fill.distance(&self.settings.blanco);

        let (verdict, distance) = if to_azul <= to_blanco {
            (ShirtColor::Azul, to_azul)
        } else {
            (ShirtColor::Blanco, to_blanco)
        };

        (distance <= self.settings.max_distance).then_some(verdict)
    }
}
