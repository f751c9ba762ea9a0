//! Bar options and their environment overrides.
//!
//! | Variable         | Format          | Example            |
//! |------------------|-----------------|--------------------|
//! | `PRISM_GRADIENT` | `<start>:<end>` | `#f03200:#0adc00`  |
//!
//! Colors are `#RGB` or `#RRGGBB`, with or without the `#`.

use std::env;

use prism_term::color::Rgb;
use prism_term::signal::INTERRUPT_EXIT_CODE;
use prism_term::terminal::Size;

use crate::error::{Error, Result};

/// Environment variable holding a `start:end` gradient override.
pub const GRADIENT_VAR: &str = "PRISM_GRADIENT";

/// Default start color, a warm red-orange.
pub const DEFAULT_START: Rgb = Rgb::new(240, 50, 0);

/// Default end color, a bright green.
pub const DEFAULT_END: Rgb = Rgb::new(10, 220, 0);

/// Everything about a bar that isn't its total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Color of the first cell.
    pub start: Rgb,
    /// Color of the last cell, and of the pre-fill.
    pub end: Rgb,
    /// Geometry assumed when the terminal can't be queried.
    pub fallback: Size,
    /// Process exit status after an interrupt.
    pub exit_code: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            fallback: Size::FALLBACK,
            exit_code: INTERRUPT_EXIT_CODE,
        }
    }
}

impl Options {
    /// Defaults with the given gradient endpoints.
    #[must_use]
    pub fn with_colors(start: Rgb, end: Rgb) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    /// Defaults, overridden by `PRISM_GRADIENT` when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if the variable is set but malformed.
    pub fn from_env() -> Result<Self> {
        match env::var(GRADIENT_VAR) {
            Ok(value) => {
                let (start, end) = parse_gradient(&value)?;
                tracing::debug!(%start, %end, "gradient from {GRADIENT_VAR}");
                Ok(Self::with_colors(start, end))
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Parse a `start:end` pair of hex colors.
///
/// # Errors
///
/// Returns [`Error::InvalidColor`] naming the offending part.
pub fn parse_gradient(s: &str) -> Result<(Rgb, Rgb)> {
    let Some((start, end)) = s.split_once(':') else {
        return Err(Error::InvalidColor(s.to_owned()));
    };
    Ok((parse_color(start)?, parse_color(end)?))
}

fn parse_color(s: &str) -> Result<Rgb> {
    Rgb::hex(s).ok_or_else(|| Error::InvalidColor(s.trim().to_owned()))
}
