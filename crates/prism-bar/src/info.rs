//! The info line drawn directly above the bar.
//!
//! ```text
//! [37/100] 37.0% | +4.12 -7.01
//!  │   │     │       │     └─ estimated time remaining (??:?? until the first unit)
//!  │   │     │       └─ elapsed
//!  │   │     └─ percentage, one decimal
//!  │   └─ total
//!  └─ completed
//! ```
//!
//! Durations pick their precision from their magnitude: `S.hh` under a
//! minute, `M:SS.hh` under an hour, `H:MM:SS.hh` beyond that.

use std::fmt;
use std::time::Duration;

use prism_term::color::CellColor;
use prism_term::output::OutputBuffer;
use prism_term::style::{Attr, Style};

/// Shown in place of the remaining time before any progress is made.
pub const UNKNOWN_REMAINING: &str = "??:??";

const COUNT_STYLE: Style = Style::fg(CellColor::GREEN).with(Attr::BOLD);
const PERCENT_STYLE: Style = Style::fg(CellColor::BRIGHT_WHITE).with(Attr::BOLD);
const ELAPSED_STYLE: Style = Style::fg(CellColor::BRIGHT_GREEN);
const REMAINING_STYLE: Style = Style::fg(CellColor::BRIGHT_YELLOW);
const SEPARATOR_STYLE: Style = Style::PLAIN.with(Attr::DIM);

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Format a duration with precision appropriate to its magnitude.
///
/// ```
/// use std::time::Duration;
/// use prism_bar::info::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(4_120)), "4.12");
/// assert_eq!(format_duration(Duration::from_secs(75)), "1:15.00");
/// assert_eq!(format_duration(Duration::from_secs(3_903)), "1:05:03.00");
/// ```
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let centis = d.subsec_millis() / 10;

    if secs < 60 {
        format!("{secs}.{centis:02}")
    } else if secs < 3_600 {
        format!("{}:{:02}.{centis:02}", secs / 60, secs % 60)
    } else {
        format!(
            "{}:{:02}:{:02}.{centis:02}",
            secs / 3_600,
            (secs % 3_600) / 60,
            secs % 60
        )
    }
}

/// Estimated time remaining: `elapsed / completed · (total - completed)`.
///
/// `None` until at least one unit is complete, since there is no rate to
/// extrapolate from.
#[must_use]
pub fn remaining(elapsed: Duration, completed: u64, total: u64) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let left = total.saturating_sub(completed);
    let nanos = elapsed.as_nanos() * u128::from(left) / u128::from(completed);
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}

// ─── InfoLine ────────────────────────────────────────────────────────────────

/// A snapshot of the numbers the info line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoLine {
    /// Units completed.
    pub completed: u64,
    /// Units in total.
    pub total: u64,
    /// Time since the session was acquired.
    pub elapsed: Duration,
}

impl InfoLine {
    /// Percentage complete, `0.0..=100.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Display precision is one decimal.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    /// The remaining-time field, formatted.
    #[must_use]
    pub fn remaining_text(&self) -> String {
        remaining(self.elapsed, self.completed, self.total)
            .map_or_else(|| UNKNOWN_REMAINING.to_owned(), format_duration)
    }

    /// Append the styled line to `out`, clipped to `max_cols` display
    /// columns so it never wraps onto the bar row.
    pub fn render(&self, out: &mut OutputBuffer, max_cols: u16) {
        let mut budget = usize::from(max_cols);
        let completed = self.completed.to_string();
        let total = format!("/{}] ", self.total);
        let percent = format!("{:.1}%", self.percent());
        let elapsed = format!("+{}", format_duration(self.elapsed));
        let remaining = format!("-{}", self.remaining_text());

        let spans: [(&str, Style); 8] = [
            ("[", Style::PLAIN),
            (completed.as_str(), COUNT_STYLE),
            (total.as_str(), Style::PLAIN),
            (percent.as_str(), PERCENT_STYLE),
            (" | ", SEPARATOR_STYLE),
            (elapsed.as_str(), ELAPSED_STYLE),
            (" ", Style::PLAIN),
            (remaining.as_str(), REMAINING_STYLE),
        ];
        for (text, style) in spans {
            if !out.push_clipped(text, style, &mut budget) {
                break;
            }
        }
    }
}

impl fmt::Display for InfoLine {
    /// The unstyled line, as it reads on screen.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {:.1}% | +{} -{}",
            self.completed,
            self.total,
            self.percent(),
            format_duration(self.elapsed),
            self.remaining_text()
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(completed: u64, total: u64, elapsed_ms: u64) -> InfoLine {
        InfoLine {
            completed,
            total,
            elapsed: Duration::from_millis(elapsed_ms),
        }
    }

    /// Strip SGR sequences to get the visible text.
    fn visible(bytes: &[u8]) -> String {
        let s = String::from_utf8(bytes.to_vec()).unwrap();
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    // ── Durations ───────────────────────────────────────────────────────

    #[test]
    fn seconds_with_hundredths() {
        assert_eq!(format_duration(Duration::ZERO), "0.00");
        assert_eq!(format_duration(Duration::from_millis(5)), "0.00");
        assert_eq!(format_duration(Duration::from_millis(1_070)), "1.07");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "59.99");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1:00.00");
        assert_eq!(format_duration(Duration::from_millis(125_500)), "2:05.50");
        assert_eq!(format_duration(Duration::from_secs(3_599)), "59:59.00");
    }

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1:00:00.00");
        assert_eq!(format_duration(Duration::from_millis(36_610_250)), "10:10:10.25");
    }

    // ── Remaining ───────────────────────────────────────────────────────

    #[test]
    fn remaining_unknown_before_first_unit() {
        assert_eq!(remaining(Duration::from_secs(9), 0, 10), None);
        assert_eq!(line(0, 10, 9_000).remaining_text(), UNKNOWN_REMAINING);
    }

    #[test]
    fn remaining_extrapolates_rate() {
        // 2s for 20 units → 0.1s/unit, 80 left → 8s.
        assert_eq!(
            remaining(Duration::from_secs(2), 20, 100),
            Some(Duration::from_secs(8))
        );
    }

    #[test]
    fn remaining_is_zero_when_done() {
        assert_eq!(
            remaining(Duration::from_secs(5), 10, 10),
            Some(Duration::ZERO)
        );
    }

    // ── Percent ─────────────────────────────────────────────────────────

    #[test]
    fn percent_one_decimal() {
        assert_eq!(format!("{:.1}", line(1, 3, 0).percent()), "33.3");
        assert_eq!(format!("{:.1}", line(50, 100, 0).percent()), "50.0");
        assert_eq!(format!("{:.1}", line(7, 7, 0).percent()), "100.0");
    }

    // ── Rendering ───────────────────────────────────────────────────────

    #[test]
    fn display_is_plain_text() {
        assert_eq!(
            line(37, 100, 4_120).to_string(),
            "[37/100] 37.0% | +4.12 -7.01"
        );
        assert_eq!(
            line(0, 100, 250).to_string(),
            "[0/100] 0.0% | +0.25 -??:??"
        );
    }

    #[test]
    fn render_matches_display_when_wide_enough() {
        let info = line(37, 100, 4_120);
        let mut out = OutputBuffer::new();
        info.render(&mut out, 200);
        assert_eq!(visible(out.as_bytes()), info.to_string());
    }

    #[test]
    fn render_styles_the_count() {
        let mut out = OutputBuffer::new();
        line(3, 9, 0).render(&mut out, 200);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.starts_with("[\x1b[1m\x1b[32m3\x1b[0m/9] "));
    }

    #[test]
    fn render_dims_the_separator() {
        let mut out = OutputBuffer::new();
        line(3, 9, 0).render(&mut out, 200);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.contains("\x1b[2m | \x1b[0m"));
    }

    #[test]
    fn render_clips_to_width() {
        let mut out = OutputBuffer::new();
        line(37, 100, 4_120).render(&mut out, 12);
        assert_eq!(visible(out.as_bytes()), "[37/100] 37.");
    }

    #[test]
    fn render_zero_width_is_empty() {
        let mut out = OutputBuffer::new();
        line(1, 2, 0).render(&mut out, 0);
        assert!(out.is_empty());
    }
}
