//! Hex color decoding.

use std::fmt;

use crate::error::{Result, ViewerError};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Build a color from channel bytes.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with alpha forced to fully opaque.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Lowercase `rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Decode `rrggbb` or `#rrggbb` into channel bytes.
///
/// # Errors
///
/// Returns [`ViewerError::Color`] for any other length or non-hex digits.
pub fn decode(hex: &str) -> Result<Rgb> {
    let digits = match hex.len() {
        6 => hex,
        7 => hex
            .strip_prefix('#')
            .ok_or_else(|| ViewerError::Color(hex.to_owned()))?,
        _ => return Err(ViewerError::Color(hex.to_owned())),
    };
    // from_str_radix would accept a leading '+'.
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ViewerError::Color(hex.to_owned()));
    }
    let value =
        u32::from_str_radix(digits, 16).map_err(|_| ViewerError::Color(hex.to_owned()))?;

    Ok(Rgb::new(
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}
