//! Terminal renderer — the bar row, the info row, and the margin.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │ caller's ordinary output     │  ← rows 0 ..= h-3, the scroll region
//!   ├──────────────────────────────┤
//!   │ [37/100] 37.0% | +4.12 -7.01 │  ← row h-2, info line
//!   │ ██████████░░░░░░░░░░░░░░░░░░ │  ← row h-1, the bar
//!   └──────────────────────────────┘
//! ```
//!
//! Every method assembles one complete unit of output in an
//! [`OutputBuffer`] and hands it to the device in a single write. Anything
//! that moves the cursor is wrapped in DECSC/DECRC, so from the caller's
//! point of view the cursor never leaves the scroll region.

use std::io::{self, Write};

use prism_term::ansi;
use prism_term::color::{CellColor, Rgb};
use prism_term::output::OutputBuffer;
use prism_term::terminal::Size;

use crate::info::InfoLine;

/// Rows kept out of the scroll region: the info line and the bar.
pub const RESERVED_ROWS: u16 = 2;

/// Draws the bar and info line for one terminal geometry.
pub struct Renderer {
    size: Size,
    out: OutputBuffer,
}

impl Renderer {
    /// A renderer for a terminal of `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            out: OutputBuffer::new(),
        }
    }

    /// The geometry this renderer draws for.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Switch to a new geometry. Nothing is drawn.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Bar width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.cols
    }

    /// Row the bar is drawn on (0-indexed, the bottom row).
    #[inline]
    #[must_use]
    pub const fn bar_row(&self) -> u16 {
        self.size.rows.saturating_sub(1)
    }

    /// Row the info line is drawn on, directly above the bar.
    #[inline]
    #[must_use]
    pub const fn info_row(&self) -> u16 {
        self.size.rows.saturating_sub(RESERVED_ROWS)
    }

    /// Whether the terminal is tall enough for a scroll region above the
    /// reserved rows.
    #[inline]
    #[must_use]
    pub const fn has_scroll_region(&self) -> bool {
        self.size.rows > RESERVED_ROWS
    }

    // ── Margin ───────────────────────────────────────────────────────

    /// Reserve the bottom rows: hide the cursor, push existing output up
    /// to make room, and confine scrolling to the rows above.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn reserve(&mut self, w: &mut impl Write) -> io::Result<()> {
        ansi::cursor_hide(&mut self.out)?;
        self.out.write_all(b"\n\n")?;
        self.push_scroll_region()?;
        ansi::cursor_up(&mut self.out, RESERVED_ROWS)?;
        self.out.flush_to(w)
    }

    /// Re-establish the margin for the current geometry and blank both
    /// reserved rows. Used after a resize, before redrawing from scratch.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn clear_reserved(&mut self, w: &mut impl Write) -> io::Result<()> {
        let rows = [self.info_row(), self.bar_row()];
        self.push_scroll_region()?;
        ansi::save_cursor(&mut self.out)?;
        for row in rows {
            ansi::cursor_to(&mut self.out, 0, row)?;
            ansi::clear_line(&mut self.out)?;
        }
        ansi::restore_cursor(&mut self.out)?;
        self.out.flush_to(w)
    }

    /// DECSTBM homes the cursor, so bracket it with save/restore. Too
    /// short for a region: clear any margin an earlier geometry left set.
    fn push_scroll_region(&mut self) -> io::Result<()> {
        ansi::save_cursor(&mut self.out)?;
        if self.has_scroll_region() {
            let bottom = self.size.rows - RESERVED_ROWS - 1;
            ansi::set_scroll_region(&mut self.out, 0, bottom)?;
        } else {
            ansi::reset_scroll_region(&mut self.out)?;
        }
        ansi::restore_cursor(&mut self.out)
    }

    // ── Bar ──────────────────────────────────────────────────────────

    /// Paint the whole bar row in one color.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn draw_fill(&mut self, w: &mut impl Write, color: Rgb) -> io::Result<()> {
        let row = self.bar_row();
        ansi::save_cursor(&mut self.out)?;
        ansi::cursor_to(&mut self.out, 0, row)?;
        ansi::bg(&mut self.out, CellColor::from(color))?;
        for _ in 0..self.width() {
            self.out.write_all(b" ")?;
        }
        ansi::reset(&mut self.out)?;
        ansi::restore_cursor(&mut self.out)?;
        self.out.flush_to(w)
    }

    /// Paint the bar cell at `column`.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn draw_cell(&mut self, w: &mut impl Write, column: u16, color: Rgb) -> io::Result<()> {
        let row = self.bar_row();
        ansi::save_cursor(&mut self.out)?;
        ansi::cursor_to(&mut self.out, column, row)?;
        ansi::bg(&mut self.out, CellColor::from(color))?;
        self.out.write_all(b" ")?;
        ansi::reset(&mut self.out)?;
        ansi::restore_cursor(&mut self.out)?;
        self.out.flush_to(w)
    }

    // ── Info line ────────────────────────────────────────────────────

    /// Replace the info row with `info`.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn draw_info(&mut self, w: &mut impl Write, info: &InfoLine) -> io::Result<()> {
        let row = self.info_row();
        if row == self.bar_row() {
            // One-row terminal: the bar wins.
            return Ok(());
        }
        let width = self.width();
        ansi::save_cursor(&mut self.out)?;
        ansi::cursor_to(&mut self.out, 0, row)?;
        ansi::clear_line(&mut self.out)?;
        info.render(&mut self.out, width);
        ansi::reset(&mut self.out)?;
        ansi::restore_cursor(&mut self.out)?;
        self.out.flush_to(w)
    }

    // ── Restore ──────────────────────────────────────────────────────

    /// Give the terminal back: show the cursor, reset the margin to the
    /// full height, and leave the cursor below the bar.
    ///
    /// # Errors
    ///
    /// Propagates device write errors.
    pub fn restore(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.out.write_all(&Self::restore_sequence())?;
        self.out.flush_to(w)
    }

    /// The bytes [`restore`](Self::restore) writes.
    ///
    /// Nothing in it depends on the geometry: the terminal may have been
    /// resized after the last one this renderer saw. Also armed as the
    /// emergency restore while a session is active.
    #[must_use]
    pub fn restore_sequence() -> Vec<u8> {
        let mut out = OutputBuffer::new();
        // Writes into a Vec cannot fail.
        let _ = ansi::reset(&mut out);
        let _ = ansi::cursor_show(&mut out);
        let _ = ansi::reset_scroll_region(&mut out);
        let _ = ansi::cursor_to_last_row(&mut out);
        let _ = out.write_all(b"\n");
        out.take()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
