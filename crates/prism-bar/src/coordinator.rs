//! Resize and interrupt handling for an active session.
//!
//! Notifications are latched by the backend and only acted on at a
//! checkpoint, which the session reaches after every complete device
//! write. Whatever piled up since the last checkpoint is coalesced:
//!
//! ```text
//!   pending                         action
//!   ─────────────────────────────   ──────────────────────────────
//!   nothing                         continue
//!   one or more resizes             recover once, restart drawing
//!   an interrupt (with or without   restore the terminal, terminate
//!   resizes)
//! ```
//!
//! Recovery re-probes the geometry, rebuilds the gradient for the new
//! width, and redraws from column zero. `completed` is never touched, so
//! any number of resizes that end at the same geometry converge on the
//! same picture.

use prism_term::signal::Notification;

use crate::backend::Backend;
use crate::gradient::Gradient;
use crate::session::{Phase, Session, logged};

/// What the drawing loop should do after a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Nothing happened; carry on.
    Continue,
    /// The geometry changed and the bar was reset; start drawing over.
    Restarted,
    /// The session was torn down; draw nothing more.
    Halted,
}

/// Drain every pending notification from `backend` and reduce them to the
/// one that matters. An interrupt outranks any number of resizes.
pub fn coalesce(backend: &mut impl Backend) -> Option<Notification> {
    let mut pending = None;
    while let Some(notification) = backend.poll() {
        match notification {
            Notification::Interrupt => return Some(Notification::Interrupt),
            Notification::Resize => pending = Some(Notification::Resize),
        }
    }
    pending
}

impl<B: Backend> Session<B> {
    /// React to whatever arrived since the last device write.
    pub(crate) fn checkpoint(&mut self) -> Flow {
        if self.phase != Phase::Active {
            return Flow::Halted;
        }
        match coalesce(&mut self.backend) {
            None => Flow::Continue,
            Some(Notification::Resize) => {
                self.recover();
                Flow::Restarted
            }
            Some(Notification::Interrupt) => {
                self.shut_down();
                Flow::Halted
            }
        }
    }

    /// Rebuild everything derived from the geometry and redraw the empty
    /// bar. The caller replays progress.
    fn recover(&mut self) {
        let size = self.backend.probe();
        self.recoveries += 1;
        tracing::debug!(
            cols = size.cols,
            rows = size.rows,
            completed = self.completed,
            "recovering from resize"
        );

        self.renderer.set_size(size);
        self.gradient = Gradient::for_bar(self.options.start, self.options.end, self.total, size.cols);
        self.rendered = 0;

        logged(self.renderer.clear_reserved(self.backend.writer()), "clear reserved rows");
        self.prefill();
    }

    /// Restore the terminal once and end the process.
    fn shut_down(&mut self) {
        tracing::debug!(completed = self.completed, "interrupted");
        self.phase = Phase::Terminated;
        self.backend.disarm();
        logged(self.renderer.restore(self.backend.writer()), "restore");
        self.backend.detach();
        self.backend.terminate(self.options.exit_code);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
