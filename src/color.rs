use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Straight-alpha RGBA color, one byte per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color \"{0}\" is empty")]
    Empty(String),
    #[error("color \"{0}\" must have 3, 4, 6 or 8 hex digits")]
    Length(String),
    #[error("color \"{0}\" contains a non-hex digit")]
    Digit(String),
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Premultiplied components, normalized to 0.0-1.0, of this RGB with
    /// `alpha` in place of its own.
    pub fn premultiplied_with_alpha(self, alpha: f32) -> [f32; 4] {
        let a = alpha.clamp(0.0, 1.0);
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.is_empty() {
            return Err(ColorParseError::Empty(s.to_string()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(s.to_string()));
        }

        // Shorthand forms double every digit: "f0a" -> "ff00aa".
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(ColorParseError::Length(s.to_string())),
        };

        let byte = |i: usize| {
            u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
                .map_err(|_| ColorParseError::Digit(s.to_string()))
        };

        let a = if expanded.len() == 8 { byte(3)? } else { 255 };
        Ok(Rgba::new(byte(0)?, byte(1)?, byte(2)?, a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}
