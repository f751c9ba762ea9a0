// SPDX-License-Identifier: MIT
//
// Output buffering — one complete control sequence per device write.
//
// Every visual change prism makes (one bar cell, the info line, the margin
// reservation, the final restore) is assembled in an `OutputBuffer` first
// and handed to the device in a single `write_all`. That makes the write
// the atomic unit of terminal output: a resize or interrupt observed
// between two writes can never split an escape sequence in half.
//
// The buffer also knows how to clip text to a display-width budget, so the
// info line never wraps onto the bar row on narrow terminals.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::style::Style;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` call.
///
/// Default capacity: 256 bytes — a bar cell is ~40 bytes and an info line
/// rarely exceeds 150, so most writes never reallocate.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 256;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Take the accumulated bytes, leaving the buffer empty.
    #[must_use]
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Append `text` in `style`, clipped to the remaining `budget` columns.
    ///
    /// Characters are appended while their display width fits; the budget
    /// is decremented by the width consumed. Zero-width and control
    /// characters are dropped. The style is closed with SGR 0 whenever it
    /// emitted anything. Returns `false` once the budget is exhausted and
    /// text had to be cut.
    pub fn push_clipped(&mut self, text: &str, style: Style, budget: &mut usize) -> bool {
        if text.is_empty() {
            return true;
        }
        if *budget == 0 {
            return false;
        }

        // Writes into a Vec cannot fail.
        let _ = style.apply(&mut self.buf);

        let mut complete = true;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let Some(w) = ch.width().filter(|&w| w > 0) else {
                continue;
            };
            if w > *budget {
                complete = false;
                break;
            }
            *budget -= w;
            let mut enc = [0u8; 4];
            self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
        }

        if !style.is_plain() {
            let _ = ansi::reset(&mut self.buf);
        }
        complete
    }

    /// Write accumulated output to `w` in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails. The buffer is cleared
    /// either way so a failed write is never replayed half-way.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = w.write_all(&self.buf).and_then(|()| w.flush());
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
