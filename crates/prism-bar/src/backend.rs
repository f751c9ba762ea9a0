//! The session's view of the outside world.
//!
//! A [`Backend`] is where rendered bytes go, where geometry comes from, and
//! how resize and interrupt notifications arrive. [`TtyBackend`] is the real
//! thing: stderr, `ioctl`, process signals. [`MemoryBackend`] records
//! everything in memory and lets notifications be scripted, which is how
//! the session is tested without a terminal.

use std::collections::VecDeque;
use std::io::{self, Write};

use prism_term::signal::{self, Notification, SignalGuard, WriteGuard};
use prism_term::terminal::{self, Size};

/// Device, geometry and notification source for a session.
pub trait Backend {
    /// The device the bar is drawn on.
    type Writer: Write;

    /// The device. Every call made on it by the renderer is one complete
    /// unit of output.
    fn writer(&mut self) -> &mut Self::Writer;

    /// Current terminal geometry. Must not fail.
    fn probe(&mut self) -> Size;

    /// Take the next pending notification, if any.
    fn poll(&mut self) -> Option<Notification>;

    /// Start receiving notifications.
    ///
    /// # Errors
    ///
    /// Fails if notifications can't be delivered to this session, for
    /// example because another session already receives them.
    fn attach(&mut self) -> io::Result<()>;

    /// Stop receiving notifications.
    fn detach(&mut self);

    /// Make `restore` the bytes written if the process dies abruptly.
    fn arm(&mut self, restore: Vec<u8>);

    /// Forget the armed restore bytes.
    fn disarm(&mut self);

    /// End the process with `code` after an interrupt.
    fn terminate(&mut self, code: i32);
}

// ─── TtyBackend ─────────────────────────────────────────────────────────────

/// A device (stderr by default) that marks each write as in flight for the
/// interrupt handler.
#[derive(Debug)]
pub struct TtyWriter<W: Write = io::Stderr> {
    inner: W,
}

impl<W: Write> Write for TtyWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _guard = WriteGuard::enter();
        self.inner.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let _guard = WriteGuard::enter();
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The real terminal on stderr.
pub struct TtyBackend {
    writer: TtyWriter,
    fallback: Size,
    exit_code: i32,
    signals: Option<SignalGuard>,
}

impl TtyBackend {
    /// A backend drawing on stderr, assuming `fallback` when the terminal
    /// can't be measured and exiting with `exit_code` on interrupt.
    #[must_use]
    pub fn new(fallback: Size, exit_code: i32) -> Self {
        Self {
            writer: TtyWriter {
                inner: io::stderr(),
            },
            fallback,
            exit_code,
            signals: None,
        }
    }
}

impl Default for TtyBackend {
    fn default() -> Self {
        Self::new(Size::FALLBACK, signal::INTERRUPT_EXIT_CODE)
    }
}

impl Backend for TtyBackend {
    type Writer = TtyWriter;

    fn writer(&mut self) -> &mut TtyWriter {
        &mut self.writer
    }

    fn probe(&mut self) -> Size {
        terminal::probe(self.fallback)
    }

    fn poll(&mut self) -> Option<Notification> {
        signal::take()
    }

    fn attach(&mut self) -> io::Result<()> {
        if self.signals.is_none() {
            self.signals = Some(SignalGuard::register(self.exit_code)?);
        }
        Ok(())
    }

    fn detach(&mut self) {
        self.signals = None;
    }

    fn arm(&mut self, restore: Vec<u8>) {
        terminal::arm_restore(restore);
    }

    fn disarm(&mut self) {
        terminal::disarm_restore();
    }

    fn terminate(&mut self, code: i32) {
        std::process::exit(code);
    }
}

// ─── MemoryBackend ──────────────────────────────────────────────────────────

/// Device that keeps every write call as a separate chunk.
#[derive(Debug, Default)]
pub struct Chunks {
    chunks: Vec<Vec<u8>>,
}

impl Chunks {
    /// Every write, in order.
    #[must_use]
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Everything written, concatenated.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

impl Write for Chunks {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.chunks.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An in-memory terminal with scripted notifications.
///
/// Notifications are queued with a delay measured in polls, so a test can
/// land one in the middle of a multi-cell update.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    output: Chunks,
    size: Size,
    scheduled: VecDeque<(usize, Notification)>,
    polls: usize,
    attached: bool,
    armed: Option<Vec<u8>>,
    exit_code: Option<i32>,
}

impl MemoryBackend {
    /// A terminal of `size` with nothing written.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Change the geometry the next probe reports.
    pub const fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /// Deliver `notification` on the next poll.
    pub fn notify(&mut self, notification: Notification) {
        self.notify_after(0, notification);
    }

    /// Deliver `notification` once `polls` further polls have come back
    /// empty.
    pub fn notify_after(&mut self, polls: usize, notification: Notification) {
        self.scheduled.push_back((self.polls + polls, notification));
    }

    /// What has been written.
    #[must_use]
    pub const fn output(&self) -> &Chunks {
        &self.output
    }

    /// Forget what has been written.
    pub fn clear_output(&mut self) {
        self.output.chunks.clear();
    }

    /// Whether notifications are currently being received.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// The armed restore bytes, if any.
    #[must_use]
    pub fn armed(&self) -> Option<&[u8]> {
        self.armed.as_deref()
    }

    /// The code passed to [`Backend::terminate`], if it was called.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

impl Backend for MemoryBackend {
    type Writer = Chunks;

    fn writer(&mut self) -> &mut Chunks {
        &mut self.output
    }

    fn probe(&mut self) -> Size {
        self.size
    }

    fn poll(&mut self) -> Option<Notification> {
        let due = self
            .scheduled
            .iter()
            .position(|&(at, _)| at <= self.polls);
        if let Some(i) = due {
            return self.scheduled.remove(i).map(|(_, n)| n);
        }
        self.polls += 1;
        None
    }

    fn attach(&mut self) -> io::Result<()> {
        if self.attached {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "backend is already attached",
            ));
        }
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn arm(&mut self, restore: Vec<u8>) {
        self.armed = Some(restore);
    }

    fn disarm(&mut self) {
        self.armed = None;
    }

    fn terminate(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
