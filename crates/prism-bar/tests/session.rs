// Whole-session behavior against the in-memory backend.
//
// The backend keeps every device write as its own chunk, so these tests
// can check both what was drawn (by parsing cell writes back into
// column → color) and how it was written (one complete sequence per
// write, nothing after a restore).

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use prism_bar::backend::MemoryBackend;
use prism_bar::config::{DEFAULT_END, DEFAULT_START};
use prism_bar::renderer::Renderer;
use prism_bar::{Error, Phase, ProgressBar, Session, interpolate};
use prism_term::color::Rgb;
use prism_term::signal::Notification;
use prism_term::terminal::Size;

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A background-colored run parsed back out of a device write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Painted {
    row: u16,
    col: u16,
    color: Rgb,
    span: usize,
}

/// Parse `ESC 7 ESC [row;colH ESC [48;2;r;g;bm <spaces> ESC [0m ESC 8`.
fn parse_painted(chunk: &[u8]) -> Option<Painted> {
    let s = std::str::from_utf8(chunk).ok()?;
    let s = s.strip_prefix("\x1b7\x1b[")?.strip_suffix("\x1b[0m\x1b8")?;
    let (pos, rest) = s.split_once('H')?;
    let (row, col) = pos.split_once(';')?;
    let rest = rest.strip_prefix("\x1b[48;2;")?;
    let (rgb, spaces) = rest.split_once('m')?;
    let mut channels = rgb.split(';').map(str::parse::<u8>);
    let color = Rgb::new(
        channels.next()?.ok()?,
        channels.next()?.ok()?,
        channels.next()?.ok()?,
    );
    if spaces.is_empty() || spaces.bytes().any(|b| b != b' ') {
        return None;
    }
    Some(Painted {
        row: row.parse::<u16>().ok()? - 1,
        col: col.parse::<u16>().ok()? - 1,
        color,
        span: spaces.len(),
    })
}

/// Single cells drawn on `row`, last write per column winning.
fn cells_on(session: &Session<MemoryBackend>, row: u16) -> BTreeMap<u16, Rgb> {
    session
        .backend()
        .output()
        .chunks()
        .iter()
        .filter_map(|c| parse_painted(c))
        .filter(|p| p.row == row && p.span == 1)
        .map(|p| (p.col, p.color))
        .collect()
}

fn bar_cells(session: &Session<MemoryBackend>) -> BTreeMap<u16, Rgb> {
    cells_on(session, session.size().rows - 1)
}

fn acquire(total: u64, size: Size) -> Session<MemoryBackend> {
    ProgressBar::new(total)
        .unwrap()
        .acquire_with(MemoryBackend::new(size))
        .unwrap()
}

fn restore_bytes() -> Vec<u8> {
    Renderer::restore_sequence()
}

// ─── Construction ────────────────────────────────────────────────────────────

#[test]
fn zero_total_never_creates_a_session() {
    assert!(matches!(ProgressBar::new(0), Err(Error::InvalidTotal)));
}

#[test]
fn acquire_reserves_then_prefills() {
    let s = acquire(100, Size::new(10, 24));
    let chunks = s.backend().output().chunks();

    assert_eq!(
        String::from_utf8(chunks[0].clone()).unwrap(),
        "\x1b[?25l\n\n\x1b7\x1b[1;22r\x1b8\x1b[2A"
    );
    assert_eq!(
        parse_painted(&chunks[1]),
        Some(Painted {
            row: 23,
            col: 0,
            color: DEFAULT_END,
            span: 10,
        })
    );
    assert!(bar_cells(&s).is_empty());
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn half_of_hundred_over_ten_columns() {
    let mut s = acquire(100, Size::new(10, 24));
    s.update(50);

    assert_eq!(s.rendered_column(), 5);
    let sequence = interpolate(DEFAULT_START, DEFAULT_END, 101).unwrap();
    let cells = bar_cells(&s);
    assert_eq!(cells.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert_eq!(cells[&4], sequence[4]);
    assert_eq!(cells[&0], DEFAULT_START);
}

#[test]
fn total_below_width() {
    let mut s = acquire(5, Size::new(20, 24));
    assert_eq!(s.gradient().len(), 21);

    s.update(5);
    assert_eq!(s.rendered_column(), 20);

    let sequence = interpolate(DEFAULT_START, DEFAULT_END, 21).unwrap();
    let cells = bar_cells(&s);
    assert_eq!(cells.len(), 20);
    for (col, color) in cells {
        assert_eq!(color, sequence[usize::from(col)], "col {col}");
    }
}

#[test]
fn split_updates_match_a_single_update() {
    let mut split = acquire(100, Size::new(37, 24));
    split.update(13);
    split.update(29);

    let mut single = acquire(100, Size::new(37, 24));
    single.update(42);

    assert_eq!(split.completed(), single.completed());
    assert_eq!(split.rendered_column(), single.rendered_column());
    assert_eq!(bar_cells(&split), bar_cells(&single));
}

#[test]
fn overshoot_clamps() {
    let mut s = acquire(100, Size::new(10, 24));
    s.update(60);
    s.update(60);
    assert_eq!(s.completed(), 100);
    assert_eq!(s.rendered_column(), 10);

    let before = s.backend().output().chunks().len();
    s.update(1);
    assert_eq!(s.backend().output().chunks().len(), before);
}

// ─── Resize ──────────────────────────────────────────────────────────────────

#[test]
fn resize_mid_update_preserves_progress() {
    let mut s = acquire(100, Size::new(10, 24));
    s.backend_mut().resize(Size::new(20, 30));
    s.backend_mut().notify_after(2, Notification::Resize);
    s.update(60);

    assert_eq!(s.completed(), 60);
    assert_eq!(s.size(), Size::new(20, 30));
    assert_eq!(s.rendered_column(), 12);
    assert_eq!(s.recoveries(), 1);

    // Replayed from column zero on the new bottom row.
    let sequence = interpolate(DEFAULT_START, DEFAULT_END, 101).unwrap();
    let cells = cells_on(&s, 29);
    assert_eq!(cells.len(), 12);
    for (col, color) in cells {
        assert_eq!(color, sequence[usize::from(col)]);
    }
}

#[test]
fn resize_while_idle_is_applied_on_next_update() {
    let mut s = acquire(10, Size::new(10, 24));
    s.update(5);
    s.backend_mut().resize(Size::new(10, 12));
    s.backend_mut().notify(Notification::Resize);
    s.update(0);

    assert_eq!(s.completed(), 5);
    assert_eq!(s.rendered_column(), 5);
    assert_eq!(cells_on(&s, 11).len(), 5);
    assert_eq!(s.backend().armed(), Some(restore_bytes().as_slice()));
}

// ─── Interrupt ───────────────────────────────────────────────────────────────

#[test]
fn interrupt_mid_update_restores_and_stops() {
    let size = Size::new(10, 24);
    let mut s = acquire(100, size);
    s.backend_mut().notify_after(3, Notification::Interrupt);
    s.update(100);

    assert_eq!(s.phase(), Phase::Terminated);
    assert_eq!(s.backend().exit_code(), Some(130));
    assert_eq!(s.rendered_column(), 3);

    let chunks = s.backend().output().chunks().to_vec();
    let last = String::from_utf8(chunks.last().unwrap().clone()).unwrap();
    assert!(last.contains("\x1b[?25h"), "cursor shown");
    assert!(last.contains("\x1b[r"), "margin reset to full height");
    assert_eq!(last.into_bytes(), restore_bytes());

    s.update(10);
    s.poll();
    s.release();
    assert_eq!(s.backend().output().chunks().len(), chunks.len());
}

#[test]
fn interrupt_restores_exactly_once() {
    let size = Size::new(10, 24);
    let mut s = acquire(100, size);
    s.backend_mut().notify_after(1, Notification::Interrupt);
    s.update(40);
    s.update(40);
    s.release();

    let restore = restore_bytes();
    let restores = s
        .backend()
        .output()
        .chunks()
        .iter()
        .filter(|c| **c == restore)
        .count();
    assert_eq!(restores, 1);
}

#[test]
fn interrupt_with_unprocessed_resize_resets_whole_screen() {
    let mut s = acquire(100, Size::new(10, 24));
    s.update(10);
    s.backend_mut().resize(Size::new(10, 40));
    s.backend_mut().notify(Notification::Resize);
    s.backend_mut().notify(Notification::Interrupt);
    s.update(1);

    assert_eq!(s.phase(), Phase::Terminated);
    assert_eq!(s.recoveries(), 0, "interrupt outranks the resize");
    let last = s.backend().output().chunks().last().cloned().unwrap();
    let last = String::from_utf8(last).unwrap();
    assert!(!last.contains("24r"), "no stale height: {last:?}");
    assert!(!last.contains("24;1H"), "no stale bottom row: {last:?}");
    assert_eq!(last.into_bytes(), restore_bytes());
}

// ─── Release ─────────────────────────────────────────────────────────────────

#[test]
fn release_after_unprocessed_resize_resets_whole_screen() {
    let mut s = acquire(100, Size::new(10, 24));
    s.update(100);
    s.backend_mut().resize(Size::new(10, 40));
    s.backend_mut().notify(Notification::Resize);
    s.release();

    assert_eq!(s.phase(), Phase::Terminated);
    assert_eq!(
        s.backend().output().chunks().last(),
        Some(&restore_bytes())
    );
}

#[test]
fn release_fills_then_restores_once() {
    let size = Size::new(10, 24);
    let mut s = acquire(100, size);
    s.update(30);
    s.release();
    s.release();

    assert_eq!(s.phase(), Phase::Terminated);
    assert_eq!(bar_cells(&s).len(), 10);

    let chunks = s.backend().output().chunks();
    assert_eq!(chunks.last(), Some(&restore_bytes()));
    let restores = chunks.iter().filter(|c| **c == restore_bytes()).count();
    assert_eq!(restores, 1);
    assert!(!s.backend().is_attached());
}

// ─── Write discipline ────────────────────────────────────────────────────────

#[test]
fn every_cursor_move_is_bracketed() {
    let mut s = acquire(50, Size::new(30, 24));
    for _ in 0..50 {
        s.update(1);
    }
    s.backend_mut().resize(Size::new(25, 20));
    s.backend_mut().notify(Notification::Resize);
    s.poll();

    // Everything after the reservation either saves and restores the
    // cursor around its work or is the final restore.
    for chunk in &s.backend().output().chunks()[1..] {
        let text = String::from_utf8(chunk.clone()).unwrap();
        assert!(text.starts_with("\x1b7"), "unbracketed write: {text:?}");
        assert!(text.ends_with("\x1b8"), "unbracketed write: {text:?}");
    }
}
