// SPDX-License-Identifier: MIT
//
// prism-term color types — 24-bit RGB and the terminal cell color.
//
// Single-character variable names (r, g, b) are the standard convention
// for color channels.
#![allow(clippy::many_single_char_names)]
//
// The bar is a TrueColor-only renderer: every cell is painted with an exact
// 24-bit background. `Rgb` is the value type the gradient works in, and
// `CellColor` is what the ANSI layer encodes. The 256-color palette is kept
// only for the info line's text accents, which use the terminal's own
// bright palette so they follow the user's theme.

use std::fmt;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// An opaque 24-bit sRGB color, one byte per channel.
///
/// # Examples
///
/// ```
/// use prism_term::color::Rgb;
///
/// let ember = Rgb::new(240, 50, 0);
/// assert_eq!(Rgb::hex("#f03200"), Some(ember));
/// assert_eq!(ember.to_hex(), "#f03200");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel, 0–255.
    pub r: u8,
    /// Green channel, 0–255.
    pub g: u8,
    /// Blue channel, 0–255.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its three channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string.
    ///
    /// Supports `#RGB` and `#RRGGBB`, with or without the leading `#`.
    /// Returns `None` for anything else (including alpha forms — the bar
    /// has no use for transparency).
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        parse_hex(s.trim())
    }

    /// Lowercase `#rrggbb` representation.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as an array, in `[r, g, b]` order.
    #[inline]
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─── CellColor ───────────────────────────────────────────────────────────────

/// Compact color as the ANSI layer encodes it.
///
/// This is what gets converted to SGR escape sequences for terminal output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index.
    Ansi256(u8),

    /// Terminal default color (inherits from terminal settings).
    #[default]
    Default,
}

impl CellColor {
    /// Bright green from the terminal's own 16-color palette.
    pub const BRIGHT_GREEN: Self = Self::Ansi256(10);
    /// Bright yellow from the terminal's own 16-color palette.
    pub const BRIGHT_YELLOW: Self = Self::Ansi256(11);
    /// Bright white from the terminal's own 16-color palette.
    pub const BRIGHT_WHITE: Self = Self::Ansi256(15);
    /// Standard green from the terminal's own 16-color palette.
    pub const GREEN: Self = Self::Ansi256(2);

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Rgb> for CellColor {
    fn from(c: Rgb) -> Self {
        Self::Rgb(c.r, c.g, c.b)
    }
}

// ─── Hex Parsing ─────────────────────────────────────────────────────────────

fn parse_hex(s: &str) -> Option<Rgb> {
    let s = s.strip_prefix('#').unwrap_or(s);
    let bytes = s.as_bytes();

    match bytes.len() {
        // #RGB
        3 => {
            let r = parse_hex_digit(bytes[0])?;
            let g = parse_hex_digit(bytes[1])?;
            let b = parse_hex_digit(bytes[2])?;
            Some(Rgb::new(r << 4 | r, g << 4 | g, b << 4 | b))
        }
        // #RRGGBB
        6 => {
            let r = parse_hex_byte(&bytes[0..2])?;
            let g = parse_hex_byte(&bytes[2..4])?;
            let b = parse_hex_byte(&bytes[4..6])?;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
