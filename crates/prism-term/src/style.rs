// SPDX-License-Identifier: MIT
//
// Text style — attributes plus foreground color for short styled spans.
//
// The bar row itself is pure background color. The info line above it is
// the only text prism draws, and it needs just three looks: bold counters,
// bright accents and a dim separator. `OutputBuffer::push_clipped` applies a `Style` with
// one SGR burst and closes it with SGR 0, so spans never leak into each
// other or into the caller's output.

use std::io::{self, Write};

use crate::ansi;
use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters.
    /// Combine with bitwise OR:
    ///
    /// ```
    /// use prism_term::style::Attr;
    ///
    /// let style = Attr::BOLD;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM       = 1 << 1;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground color plus attributes for a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Text color. [`CellColor::Default`] leaves the terminal's color alone.
    pub fg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

impl Style {
    /// The unstyled style: writes no SGR at all.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// A style with only a foreground color.
    #[inline]
    #[must_use]
    pub const fn fg(color: CellColor) -> Self {
        Self {
            fg: color,
            attrs: Attr::empty(),
        }
    }

    /// Add attributes to this style.
    #[inline]
    #[must_use]
    pub const fn with(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }

    /// Whether applying this style would emit nothing.
    #[inline]
    #[must_use]
    pub const fn is_plain(self) -> bool {
        self.fg.is_default() && self.attrs.is_empty()
    }

    /// Emit the SGR sequences that switch the terminal into this style.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying writer.
    pub fn apply(self, w: &mut impl Write) -> io::Result<()> {
        ansi::attrs(w, self.attrs)?;
        if !self.fg.is_default() {
            ansi::fg(w, self.fg)?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
