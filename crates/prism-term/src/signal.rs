// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Process-wide resize and interrupt notifications.
//
// SIGWINCH and SIGINT are turned into two latched `AtomicBool` flags that
// the session polls between device writes. Storing to an atomic is one of
// the few things a signal handler may do, so the resize handler does
// nothing else.
//
// The interrupt handler does one more thing. If no device write is in
// flight, the main thread is parked somewhere harmless (sleeping, doing
// the caller's work), so the handler restores the terminal itself with the
// armed sequence and `_exit`s — Ctrl-C must not wait for the next
// `update`. If a write *is* in flight, the handler only latches the flag;
// the session sees it right after the write completes and runs the same
// teardown. Either way no escape sequence is ever split.
//
// Registration is explicit and exclusive: `SignalGuard::register` installs
// both handlers and remembers the previous dispositions, and dropping the
// guard puts them back. Only one guard may exist at a time.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::terminal;

/// Default exit status when the interrupt handler terminates the process
/// itself (128 + SIGINT, the shell convention).
pub const INTERRUPT_EXIT_CODE: i32 = 130;

// ─── Notification ───────────────────────────────────────────────────────────

/// An external event the session must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The terminal's dimensions changed (SIGWINCH).
    Resize,
    /// Immediate termination was requested (SIGINT).
    Interrupt,
}

// ─── Flags ──────────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler.
static RESIZE_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Set by the SIGINT handler.
static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Set while a complete control sequence is being written to the device.
static WRITE_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

/// Set while a `SignalGuard` exists.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Status the interrupt handler exits with.
static EXIT_CODE: AtomicI32 = AtomicI32::new(INTERRUPT_EXIT_CODE);

/// Take the next pending notification, clearing its flag.
///
/// Interrupts take priority over resizes: there is no point redrawing a
/// bar that is about to be torn down.
#[must_use]
pub fn take() -> Option<Notification> {
    if INTERRUPT_RECEIVED.swap(false, Ordering::SeqCst) {
        return Some(Notification::Interrupt);
    }
    if RESIZE_RECEIVED.swap(false, Ordering::SeqCst) {
        return Some(Notification::Resize);
    }
    None
}

// ─── Write Bracketing ───────────────────────────────────────────────────────

/// Marks a device write as in flight until dropped.
///
/// While one is alive the interrupt handler defers to the session instead
/// of writing to the terminal itself.
pub struct WriteGuard {
    _private: (),
}

impl WriteGuard {
    /// Mark a device write as in flight.
    #[must_use]
    pub fn enter() -> Self {
        WRITE_IN_PROGRESS.store(true, Ordering::SeqCst);
        Self { _private: () }
    }
}

/// Whether a [`WriteGuard`] is currently alive.
#[must_use]
pub fn write_in_flight() -> bool {
    WRITE_IN_PROGRESS.load(Ordering::SeqCst)
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        WRITE_IN_PROGRESS.store(false, Ordering::SeqCst);
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

#[cfg(unix)]
extern "C" fn on_resize(_sig: libc::c_int) {
    RESIZE_RECEIVED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn on_interrupt(_sig: libc::c_int) {
    INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
    if !write_in_flight() && terminal::emergency_restore() {
        unsafe { libc::_exit(EXIT_CODE.load(Ordering::SeqCst)) };
    }
}

#[cfg(unix)]
fn install(sig: libc::c_int, handler: extern "C" fn(libc::c_int)) -> io::Result<libc::sigaction> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);

        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(sig, &raw const sa, &raw mut previous) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(previous)
    }
}

#[cfg(unix)]
fn reinstate(sig: libc::c_int, previous: &libc::sigaction) {
    unsafe {
        libc::sigaction(sig, previous, std::ptr::null_mut());
    }
}

// ─── SignalGuard ────────────────────────────────────────────────────────────

/// Exclusive registration of the resize and interrupt handlers.
///
/// Previous dispositions are reinstated on drop. If an interrupt was
/// latched but never consumed by the time the guard drops, SIGINT is
/// re-raised under the reinstated disposition so the request is honoured
/// rather than lost.
pub struct SignalGuard {
    #[cfg(unix)]
    previous_winch: libc::sigaction,
    #[cfg(unix)]
    previous_int: libc::sigaction,
}

impl SignalGuard {
    /// Install the handlers. An interrupt that the handler services on its
    /// own ends the process with `exit_code`.
    ///
    /// Clears any stale latched notifications first.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::AlreadyExists`] if another guard is alive,
    /// or the OS error if `sigaction` fails.
    pub fn register(exit_code: i32) -> io::Result<Self> {
        if REGISTERED.swap(true, Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "signal handlers are already registered by another session",
            ));
        }

        RESIZE_RECEIVED.store(false, Ordering::SeqCst);
        INTERRUPT_RECEIVED.store(false, Ordering::SeqCst);
        EXIT_CODE.store(exit_code, Ordering::SeqCst);

        match Self::install_all() {
            Ok(guard) => {
                tracing::debug!(exit_code, "resize and interrupt handlers registered");
                Ok(guard)
            }
            Err(e) => {
                REGISTERED.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    #[cfg(unix)]
    fn install_all() -> io::Result<Self> {
        let previous_winch = install(libc::SIGWINCH, on_resize)?;
        let previous_int = match install(libc::SIGINT, on_interrupt) {
            Ok(prev) => prev,
            Err(e) => {
                reinstate(libc::SIGWINCH, &previous_winch);
                return Err(e);
            }
        };
        Ok(Self {
            previous_winch,
            previous_int,
        })
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn install_all() -> io::Result<Self> {
        Ok(Self {})
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            reinstate(libc::SIGWINCH, &self.previous_winch);
            reinstate(libc::SIGINT, &self.previous_int);

            if INTERRUPT_RECEIVED.swap(false, Ordering::SeqCst) {
                tracing::debug!("re-raising interrupt received during teardown");
                unsafe {
                    libc::raise(libc::SIGINT);
                }
            }
        }

        RESIZE_RECEIVED.store(false, Ordering::SeqCst);
        REGISTERED.store(false, Ordering::SeqCst);
        tracing::debug!("resize and interrupt handlers deregistered");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
