//! Session lifecycle — `Inactive → Active → Terminated`.
//!
//! A [`ProgressBar`] is the inactive configuration: a validated total and
//! its [`Options`]. [`ProgressBar::acquire`] takes the terminal and returns
//! an active [`Session`]; [`Session::release`] (or dropping the session)
//! gives it back. `Terminated` is absorbing: every call after it is a no-op.
//!
//! Drawing is incremental. The session remembers how far the visible bar
//! has been drawn (`rendered`) and each update draws only the cells between
//! that column and the newly mapped target, polling for notifications
//! after every device write.

use std::io;
use std::time::{Duration, Instant};

use prism_term::color::Rgb;
use prism_term::terminal::Size;

use crate::backend::{Backend, TtyBackend};
use crate::config::Options;
use crate::coordinator::Flow;
use crate::error::{Error, Result};
use crate::gradient::Gradient;
use crate::info::InfoLine;
use crate::mapper::column_for;
use crate::renderer::Renderer;

/// Where a session is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not yet drawing: the terminal is being acquired.
    Inactive,
    /// Owns the reserved rows and draws on update.
    Active,
    /// Released or interrupted. Nothing more is drawn.
    Terminated,
}

// ─── ProgressBar ────────────────────────────────────────────────────────────

/// A validated, not yet acquired progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    total: u64,
    options: Options,
}

impl ProgressBar {
    /// A bar over `total` units with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTotal`] if `total` is zero.
    pub fn new(total: u64) -> Result<Self> {
        Self::with_options(total, Options::default())
    }

    /// A bar over `total` units running from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTotal`] if `total` is zero.
    pub fn with_colors(total: u64, start: Rgb, end: Rgb) -> Result<Self> {
        Self::with_options(total, Options::with_colors(start, end))
    }

    /// A bar over `total` units with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTotal`] if `total` is zero.
    pub fn with_options(total: u64, options: Options) -> Result<Self> {
        if total == 0 {
            return Err(Error::InvalidTotal);
        }
        Ok(Self { total, options })
    }

    /// Units in total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The bar's options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Take the real terminal (stderr) and start drawing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if another session already owns the terminal
    /// or the terminal can't be written.
    pub fn acquire(self) -> Result<Session> {
        let backend = TtyBackend::new(self.options.fallback, self.options.exit_code);
        self.acquire_with(backend)
    }

    /// Take `backend` and start drawing: hide the cursor, reserve the
    /// bottom rows, pre-fill the bar in the end color, and draw the info
    /// line at zero progress.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the backend refuses to attach or the
    /// reservation can't be written.
    pub fn acquire_with<B: Backend>(self, mut backend: B) -> Result<Session<B>> {
        backend.attach()?;
        let size = backend.probe();

        let mut session = Session {
            backend,
            renderer: Renderer::new(size),
            gradient: Gradient::for_bar(self.options.start, self.options.end, self.total, size.cols),
            options: self.options,
            total: self.total,
            completed: 0,
            rendered: 0,
            started: Instant::now(),
            phase: Phase::Inactive,
            recoveries: 0,
        };

        session.backend.arm(Renderer::restore_sequence());
        if let Err(e) = session.renderer.reserve(session.backend.writer()) {
            tracing::warn!(error = %e, "could not reserve the bottom rows");
            session.backend.disarm();
            let _ = session.renderer.restore(session.backend.writer());
            session.backend.detach();
            session.phase = Phase::Terminated;
            return Err(Error::Io(e));
        }

        session.phase = Phase::Active;
        tracing::debug!(
            total = session.total,
            cols = size.cols,
            rows = size.rows,
            "session acquired"
        );
        session.prefill();
        session.render();
        Ok(session)
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

/// An active progress bar that owns the bottom of the terminal.
///
/// Only one session may own the terminal at a time; acquiring a second
/// one while the first is alive fails.
pub struct Session<B: Backend = TtyBackend> {
    pub(crate) backend: B,
    pub(crate) renderer: Renderer,
    pub(crate) gradient: Gradient,
    pub(crate) options: Options,
    pub(crate) total: u64,
    pub(crate) completed: u64,
    pub(crate) rendered: u16,
    pub(crate) started: Instant,
    pub(crate) phase: Phase,
    pub(crate) recoveries: u32,
}

impl<B: Backend> Session<B> {
    /// Advance by `n` units and redraw.
    ///
    /// Progress past the total is clamped. Once complete, further updates
    /// do nothing.
    pub fn update(&mut self, n: u64) {
        if self.phase != Phase::Active || self.completed == self.total {
            return;
        }
        if self.checkpoint() == Flow::Halted {
            return;
        }
        self.completed = self.completed.saturating_add(n).min(self.total);
        self.render();
    }

    /// Handle any pending notification without advancing.
    ///
    /// For callers that go a long time between updates and want a resize
    /// reflected promptly.
    pub fn poll(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        if self.checkpoint() == Flow::Restarted {
            self.render();
        }
    }

    /// Give the terminal back.
    ///
    /// Incomplete progress is first drawn out to 100%. Then the cursor is
    /// shown, the margin reset to the full height, and the cursor left
    /// below the bar. Calling this again does nothing.
    pub fn release(&mut self) {
        self.close(true);
    }

    /// Tear down, drawing the bar out to 100% first when `fill` is set.
    pub(crate) fn close(&mut self, fill: bool) {
        if self.phase != Phase::Active {
            return;
        }
        if fill && self.completed < self.total {
            self.completed = self.total;
            self.render();
            if self.phase != Phase::Active {
                return;
            }
        }

        self.phase = Phase::Terminated;
        self.backend.disarm();
        logged(self.renderer.restore(self.backend.writer()), "restore");
        self.backend.detach();
        tracing::debug!(
            elapsed_ms = self.started.elapsed().as_millis(),
            recoveries = self.recoveries,
            "session released"
        );
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    /// Paint the full-width bar in the end color.
    pub(crate) fn prefill(&mut self) {
        let end = self.gradient.end();
        logged(self.renderer.draw_fill(self.backend.writer(), end), "pre-fill");
    }

    /// Draw from the rendered column up to the current target, then the
    /// info line. Starts over whenever a resize lands in between.
    pub(crate) fn render(&mut self) {
        'redraw: loop {
            let target = column_for(self.completed, self.total, self.renderer.width());
            while self.rendered < target {
                let column = self.rendered;
                let color = self.gradient.color_at(usize::from(column));
                logged(
                    self.renderer.draw_cell(self.backend.writer(), column, color),
                    "draw cell",
                );
                self.rendered += 1;
                match self.checkpoint() {
                    Flow::Continue => {}
                    Flow::Restarted => continue 'redraw,
                    Flow::Halted => return,
                }
            }

            let info = self.info();
            logged(self.renderer.draw_info(self.backend.writer(), &info), "draw info");
            match self.checkpoint() {
                Flow::Restarted => continue 'redraw,
                Flow::Continue | Flow::Halted => return,
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// Units completed so far.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.completed
    }

    /// Units in total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// How far the visible bar has been drawn, in `[0, width]`.
    #[must_use]
    pub const fn rendered_column(&self) -> u16 {
        self.rendered
    }

    /// The geometry currently drawn for.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.renderer.size()
    }

    /// The gradient for the current geometry.
    #[must_use]
    pub const fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// The options the bar was built with.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Where the session is in its lifetime.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Time since the session was acquired.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Resizes recovered from so far.
    #[must_use]
    pub const fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// The numbers the info line currently shows.
    #[must_use]
    pub fn info(&self) -> InfoLine {
        InfoLine {
            completed: self.completed,
            total: self.total,
            elapsed: self.elapsed(),
        }
    }

    /// The backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably. Used to script notifications in tests.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        // Unwinding: the work never finished, so don't show it as done.
        self.close(!std::thread::panicking());
    }
}

/// Log a failed device write. Rendering never fails the caller.
pub(crate) fn logged(result: io::Result<()>, action: &'static str) {
    if let Err(e) = result {
        tracing::warn!(error = %e, action, "terminal write failed");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use prism_term::signal::Notification;

    fn acquire(total: u64, cols: u16) -> Session<MemoryBackend> {
        ProgressBar::new(total)
            .unwrap()
            .acquire_with(MemoryBackend::new(Size::new(cols, 24)))
            .unwrap()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn zero_total_is_rejected() {
        assert!(matches!(ProgressBar::new(0), Err(Error::InvalidTotal)));
        assert!(matches!(
            ProgressBar::with_colors(0, Rgb::new(0, 0, 0), Rgb::new(1, 1, 1)),
            Err(Error::InvalidTotal)
        ));
    }

    #[test]
    fn acquire_activates() {
        let s = acquire(100, 10);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.completed(), 0);
        assert_eq!(s.rendered_column(), 0);
        assert!(s.backend().is_attached());
        assert!(s.backend().armed().is_some());
    }

    #[test]
    fn acquire_fails_when_backend_is_taken() {
        let mut backend = MemoryBackend::new(Size::new(10, 24));
        backend.attach().unwrap();
        let err = ProgressBar::new(5).unwrap().acquire_with(backend);
        assert!(matches!(err, Err(Error::Io(_))));
    }

    // ── Updates ─────────────────────────────────────────────────────────

    #[test]
    fn update_advances_rendered_column() {
        let mut s = acquire(100, 10);
        s.update(50);
        assert_eq!(s.completed(), 50);
        assert_eq!(s.rendered_column(), 5);
        s.update(1);
        assert_eq!(s.rendered_column(), 6);
    }

    #[test]
    fn update_clamps_to_total() {
        let mut s = acquire(10, 20);
        s.update(7);
        s.update(u64::MAX);
        assert_eq!(s.completed(), 10);
        assert_eq!(s.rendered_column(), 20);

        let before = s.backend().output().chunks().len();
        s.update(3);
        assert_eq!(s.backend().output().chunks().len(), before);
    }

    #[test]
    fn updates_after_release_are_ignored() {
        let mut s = acquire(10, 20);
        s.release();
        let before = s.backend().output().chunks().len();
        s.update(3);
        s.poll();
        assert_eq!(s.completed(), 10);
        assert_eq!(s.backend().output().chunks().len(), before);
    }

    // ── Release ─────────────────────────────────────────────────────────

    #[test]
    fn release_completes_and_detaches() {
        let mut s = acquire(100, 10);
        s.update(30);
        s.release();
        assert_eq!(s.phase(), Phase::Terminated);
        assert_eq!(s.completed(), 100);
        assert_eq!(s.rendered_column(), 10);
        assert!(!s.backend().is_attached());
        assert!(s.backend().armed().is_none());
    }

    #[test]
    fn close_without_fill_only_restores() {
        let mut s = acquire(100, 10);
        s.update(30);
        s.backend_mut().clear_output();
        s.close(false);
        assert_eq!(s.phase(), Phase::Terminated);
        assert_eq!(s.completed(), 30);
        assert_eq!(s.rendered_column(), 3);
        assert_eq!(
            s.backend().output().chunks(),
            &[Renderer::restore_sequence()]
        );
        assert!(!s.backend().is_attached());
    }

    #[test]
    fn release_is_idempotent() {
        let mut s = acquire(3, 10);
        s.release();
        let after_first = s.backend().output().chunks().len();
        s.release();
        assert_eq!(s.backend().output().chunks().len(), after_first);
    }

    // ── Notifications ───────────────────────────────────────────────────

    #[test]
    fn poll_applies_pending_resize() {
        let mut s = acquire(100, 10);
        s.update(40);
        s.backend_mut().resize(Size::new(20, 30));
        s.backend_mut().notify(Notification::Resize);
        s.poll();
        assert_eq!(s.size(), Size::new(20, 30));
        assert_eq!(s.rendered_column(), 8);
        assert_eq!(s.completed(), 40);
        assert_eq!(s.recoveries(), 1);
    }

    #[test]
    fn interrupt_terminates() {
        let mut s = acquire(100, 10);
        s.backend_mut().notify(Notification::Interrupt);
        s.update(10);
        assert_eq!(s.phase(), Phase::Terminated);
        assert_eq!(s.backend().exit_code(), Some(130));
        assert_eq!(s.completed(), 0, "interrupted before advancing");
    }
}
