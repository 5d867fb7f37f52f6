//! Glyph colors: `Srgb` and the indexed [`ColorTable`] particles draw from.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a `"#rrggbb"` hex string, so the round-trip is quantized to
/// 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    /// Parses `"#rrggbb"` or `"rrggbb"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits in '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} in '{hex}': {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Quantizes to 8-bit channels, clamping out-of-range components.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Formats as `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Removes the sRGB transfer curve, giving linear-light `[r, g, b]`.
    pub fn to_linear(self) -> [f64; 3] {
        [self.r, self.g, self.b].map(|c| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        })
    }

    /// Applies the sRGB transfer curve to linear-light `[r, g, b]`.
    pub fn from_linear(linear: [f64; 3]) -> Srgb {
        let [r, g, b] = linear.map(|c| {
            let c = c.clamp(0.0, 1.0);
            if c <= 0.0031308 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        });
        Srgb { r, g, b }
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Non-empty table of glyph colors addressed by `colorIndex`.
///
/// The production table holds a single entry, which makes index selection a
/// no-op; longer tables are picked from uniformly at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Srgb>", into = "Vec<Srgb>")]
pub struct ColorTable {
    colors: Vec<Srgb>,
}

impl ColorTable {
    /// Largest table a `u8` color index can address.
    pub const MAX_LEN: usize = u8::MAX as usize + 1;

    /// Builds a table, rejecting empty or oversized lists.
    pub fn new(colors: Vec<Srgb>) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::EmptyColorTable);
        }
        if colors.len() > Self::MAX_LEN {
            return Err(EngineError::invalid_param(
                "colors",
                format!("at most {} entries", Self::MAX_LEN),
            ));
        }
        Ok(Self { colors })
    }

    /// One-color table.
    pub fn single(color: Srgb) -> Self {
        Self {
            colors: vec![color],
        }
    }

    /// Builds a table from hex strings.
    pub fn from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Srgb::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping out-of-range indices.
    pub fn get(&self, index: usize) -> Srgb {
        self.colors[index % self.colors.len()]
    }

    pub fn colors(&self) -> &[Srgb] {
        &self.colors
    }
}

impl TryFrom<Vec<Srgb>> for ColorTable {
    type Error = EngineError;

    fn try_from(colors: Vec<Srgb>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<ColorTable> for Vec<Srgb> {
    fn from(table: ColorTable) -> Self {
        table.colors
    }
}
