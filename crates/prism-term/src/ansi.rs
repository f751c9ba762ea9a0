// SPDX-License-Identifier: MIT
//
// Escape sequences, byte for byte.
//
// Every function here appends one terminal command to a writer and nothing
// else. Deciding what to draw and when belongs to the bar's renderer; this
// module only owns the encodings: cursor visibility, DEC save/restore,
// scroll margins (DECSTBM), absolute moves, line clearing, and SGR color
// and attributes.
//
// Coordinates are 0-indexed here and converted to the terminal's 1-indexed
// form on the way out. Writers are usually an `OutputBuffer`, so the
// `io::Result`s only ever carry errors from a caller-supplied device.

use std::io::{self, Write};

use crate::color::CellColor;
use crate::style::Attr;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the first column of the bottom row, whatever the
/// height. CUP clamps an out-of-range row to the last one.
#[inline]
pub fn cursor_to_last_row(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[9999;1H")
}

/// Move the cursor up `n` rows (CUU). Does nothing for `n == 0`, since
/// CUU treats a zero parameter as one.
#[inline]
pub fn cursor_up(w: &mut impl Write, n: u16) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{n}A")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Save the cursor position and attributes (DECSC).
///
/// Uses the DEC form `ESC 7` rather than the SCO `CSI s`, which some
/// terminals reinterpret when left/right margins are enabled.
#[inline]
pub fn save_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b7")
}

/// Restore the cursor position saved by [`save_cursor`] (DECRC).
#[inline]
pub fn restore_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b8")
}

// ─── Margins ─────────────────────────────────────────────────────────────────

/// Restrict scrolling to rows `top..=bottom` (DECSTBM).
///
/// Output that reaches `bottom` scrolls the region only; rows outside it
/// stay put. Note that DECSTBM also homes the cursor, so callers that care
/// about the cursor must bracket this with [`save_cursor`]/[`restore_cursor`].
#[inline]
pub fn set_scroll_region(w: &mut impl Write, top: u16, bottom: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}r", u32::from(top) + 1, u32::from(bottom) + 1)
}

/// Let the whole screen scroll again (DECSTBM with no parameters).
///
/// Unlike [`set_scroll_region`] this needs no knowledge of the height, so
/// it is correct even when the terminal was resized after the margin was
/// set. Also homes the cursor.
#[inline]
pub fn reset_scroll_region(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[r")
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// Clear the entire current line (EL 2). The cursor does not move.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2K")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Which half of a cell an SGR color applies to.
#[derive(Clone, Copy)]
enum Plane {
    Fore,
    Back,
}

impl Plane {
    /// SGR base: standard colors are `base + n`, bright ones `base + 60 + n`,
    /// extended forms `base + 8`, and the default `base + 9`.
    const fn base(self) -> u16 {
        match self {
            Self::Fore => 30,
            Self::Back => 40,
        }
    }
}

fn sgr_color(w: &mut impl Write, plane: Plane, c: CellColor) -> io::Result<()> {
    let base = plane.base();
    match c {
        CellColor::Default => write!(w, "\x1b[{}m", base + 9),
        CellColor::Ansi256(n @ 0..=7) => write!(w, "\x1b[{}m", base + u16::from(n)),
        CellColor::Ansi256(n @ 8..=15) => write!(w, "\x1b[{}m", base + 52 + u16::from(n)),
        CellColor::Ansi256(n) => write!(w, "\x1b[{};5;{n}m", base + 8),
        CellColor::Rgb(r, g, b) => write!(w, "\x1b[{};2;{r};{g};{b}m", base + 8),
    }
}

/// Set the text color. The info line uses the compact 16-color codes.
pub fn fg(w: &mut impl Write, c: CellColor) -> io::Result<()> {
    sgr_color(w, Plane::Fore, c)
}

/// Set the background color. Bar cells are a space on a 24-bit background.
pub fn bg(w: &mut impl Write, c: CellColor) -> io::Result<()> {
    sgr_color(w, Plane::Back, c)
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

const ATTR_CODES: [(Attr, u8); 2] = [(Attr::BOLD, 1), (Attr::DIM, 2)];

/// Emit every set attribute in one SGR sequence (`\x1b[1;2m` for bold and
/// dim). Nothing is written for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    let mut codes = ATTR_CODES
        .iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|&(_, code)| code);

    let Some(first) = codes.next() else {
        return Ok(());
    };
    write!(w, "\x1b[{first}")?;
    for code in codes {
        write!(w, ";{code}")?;
    }
    w.write_all(b"m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
