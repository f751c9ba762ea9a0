// SPDX-License-Identifier: MIT
//
// Terminal geometry and emergency restore.
//
// Safety: This module necessarily uses `unsafe` for ioctl (TIOCGWINSZ) and
// raw fd writes. These are the standard POSIX interfaces for terminal
// control — there is no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Two jobs live here.
//
// Geometry: query the terminal size, trying stdout first and stderr second
// (the bar itself draws on stderr, so a redirected stdout must not hide
// the real terminal), and fall back to a fixed size when neither is a tty.
//
// Emergency restore: while a session owns the scroll margin, a pre-built
// restore sequence is "armed" in process-wide state. The panic hook and
// the SIGINT handler can write it without touching any lock or allocator —
// one raw `write(2)` to fd 2 — so the user gets their full-height terminal
// and cursor back even when the process dies mid-frame. Taking the armed
// sequence is an atomic swap, which is what makes the restore happen at
// most once no matter how many paths race to perform it.

use std::ptr;
use std::sync::Once;
use std::sync::atomic::{AtomicPtr, Ordering};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// The size assumed when no terminal can be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Create a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::FALLBACK
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the size of the terminal attached to `fd` via `ioctl(TIOCGWINSZ)`.
#[cfg(unix)]
fn size_of_fd(fd: libc::c_int) -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// Query the current terminal size.
///
/// Tries stdout, then stderr. Returns `None` if neither is a terminal or
/// the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    size_of_fd(libc::STDOUT_FILENO).or_else(|| size_of_fd(libc::STDERR_FILENO))
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Query the terminal size, falling back to `fallback` when it can't be
/// determined. Never fails.
#[must_use]
pub fn probe(fallback: Size) -> Size {
    get_size().unwrap_or_else(|| {
        tracing::debug!(
            cols = fallback.cols,
            rows = fallback.rows,
            "terminal size unavailable, using fallback"
        );
        fallback
    })
}

// ─── Emergency Restore ──────────────────────────────────────────────────────

/// The armed restore sequence, or null when nothing is armed.
///
/// An `AtomicPtr` rather than a `Mutex`: the SIGINT handler reads it, and
/// locking inside a signal handler can deadlock against the interrupted
/// thread.
static ARMED_RESTORE: AtomicPtr<Vec<u8>> = AtomicPtr::new(ptr::null_mut());

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Arm `sequence` as the bytes to write if the process dies while the
/// terminal is in a modified state. Replaces any previously armed sequence.
///
/// Also installs the restoring panic hook (once per process).
pub fn arm_restore(sequence: Vec<u8>) {
    install_panic_hook();

    let fresh = Box::into_raw(Box::new(sequence));
    let old = ARMED_RESTORE.swap(fresh, Ordering::SeqCst);
    if !old.is_null() {
        // SAFETY: every non-null pointer stored in ARMED_RESTORE came from
        // Box::into_raw above, and the swap gave us exclusive ownership.
        drop(unsafe { Box::from_raw(old) });
    }
}

/// Disarm the restore sequence. Returns `true` if one was armed.
///
/// Call this right before performing the orderly restore, so no other path
/// can write it a second time.
pub fn disarm_restore() -> bool {
    let old = ARMED_RESTORE.swap(ptr::null_mut(), Ordering::SeqCst);
    if old.is_null() {
        return false;
    }
    // SAFETY: see `arm_restore`.
    drop(unsafe { Box::from_raw(old) });
    true
}

/// Take the armed sequence and write it straight to stderr's descriptor.
///
/// Async-signal-safe: one atomic swap and one `write(2)`. The sequence is
/// deliberately leaked because this only runs on the way out of the
/// process, and freeing memory is not signal-safe. Returns `true` if a
/// sequence was armed and written.
pub fn emergency_restore() -> bool {
    let armed = ARMED_RESTORE.swap(ptr::null_mut(), Ordering::SeqCst);
    if armed.is_null() {
        return false;
    }

    // SAFETY: non-null pointers come from Box::into_raw in `arm_restore`,
    // and the swap made this the only reference.
    let bytes: &Vec<u8> = unsafe { &*armed };

    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDERR_FILENO,
            bytes.as_ptr().cast::<libc::c_void>(),
            bytes.len(),
        );
    }

    #[cfg(not(unix))]
    {
        use std::io::Write;
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(bytes);
        let _ = stderr.flush();
    }

    true
}

/// Serializes unit tests that touch the process-wide armed sequence or the
/// signal flags.
#[cfg(test)]
pub(crate) static GLOBAL_STATE: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic while the margin is reserved leaves the user's
/// shell confined to a shrunken scroll region with a hidden cursor. The
/// hook writes the armed sequence, then delegates to the original handler
/// so the message prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────
