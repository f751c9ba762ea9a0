//! Gradient interpolation — an ordered run of colors between two endpoints.
//!
//! Each channel is interpolated on its own:
//!
//! ```text
//! t_i   = i / (steps - 1)          (t = 0 when steps == 1)
//! c_i   = round((1 - t_i)·start + t_i·end)
//! ```
//!
//! The `(1 - t)·a + t·b` form (rather than `a + t·(b - a)`) is exact at both
//! ends, so the first color is always the start color and the last is
//! always the end color. Rounding each channel separately can make adjacent
//! steps differ by slightly uneven amounts; that is expected.

use std::time::{SystemTime, UNIX_EPOCH};

use prism_term::color::Rgb;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Interpolate `steps` colors from `start` to `end`, both inclusive.
///
/// # Errors
///
/// Returns [`Error::InvalidSteps`] if `steps` is zero.
pub fn interpolate(start: Rgb, end: Rgb, steps: usize) -> Result<Vec<Rgb>> {
    Ok(Gradient::new(start, end, steps)?.iter().collect())
}

/// The color at step `i` of a `steps`-long gradient.
fn step_color(start: Rgb, end: Rgb, i: usize, steps: usize) -> Rgb {
    let last = steps.saturating_sub(1);
    let t = if last == 0 { 0.0 } else { ratio(i.min(last), last) };
    let [r0, g0, b0] = start.channels();
    let [r1, g1, b1] = end.channels();
    Rgb::new(lerp(r0, r1, t), lerp(g0, g1, t), lerp(b0, b1, t))
}

#[allow(clippy::cast_precision_loss)] // Step counts are far below 2^52.
fn ratio(i: usize, last: usize) -> f64 {
    i as f64 / last as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: u8, b: u8, t: f64) -> u8 {
    // Both terms are non-negative and sum to at most 255.
    (1.0 - t)
        .mul_add(f64::from(a), t * f64::from(b))
        .round()
        .clamp(0.0, 255.0) as u8
}

// ---------------------------------------------------------------------------
// Gradient
// ---------------------------------------------------------------------------

/// A gradient sequence of a fixed length between two endpoints.
///
/// Colors are computed from their index on demand rather than stored, so
/// a bar over millions of units costs nothing up front. Indexing is pure:
/// the same index always yields the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    start: Rgb,
    end: Rgb,
    steps: usize,
}

impl Gradient {
    /// A gradient with exactly `steps` colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSteps`] if `steps` is zero.
    pub fn new(start: Rgb, end: Rgb, steps: usize) -> Result<Self> {
        if steps == 0 {
            return Err(Error::InvalidSteps);
        }
        Ok(Self { start, end, steps })
    }

    /// The gradient for a bar of `total` units drawn across `width`
    /// columns: `max(total, width) + 1` colors.
    #[must_use]
    pub fn for_bar(start: Rgb, end: Rgb, total: u64, width: u16) -> Self {
        let steps = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .max(usize::from(width))
            .saturating_add(1);
        Self { start, end, steps }
    }

    /// The color at `index`, or the end color when `index` is past the end.
    #[inline]
    #[must_use]
    pub fn color_at(&self, index: usize) -> Rgb {
        if index >= self.steps {
            return self.end;
        }
        step_color(self.start, self.end, index, self.steps)
    }

    /// The start color.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> Rgb {
        self.start
    }

    /// The end color.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Rgb {
        self.end
    }

    /// Number of colors in the sequence.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps
    }

    /// Whether the sequence is empty. Never true for a constructed gradient.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Iterate over the colors in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Rgb> + '_ {
        (0..self.steps).map(|i| step_color(self.start, self.end, i, self.steps))
    }
}

// ---------------------------------------------------------------------------
// Random endpoints
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG. No external `rand` crate needed.
struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    const fn next(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    #[allow(clippy::cast_possible_truncation)] // Taking the top byte on purpose.
    const fn next_u8(&mut self) -> u8 {
        (self.next() >> 24) as u8
    }

    fn next_rgb(&mut self) -> Rgb {
        Rgb::new(self.next_u8(), self.next_u8(), self.next_u8())
    }
}

/// A pair of random gradient endpoints, reproducible from `seed`.
#[must_use]
pub fn random_pair(seed: u32) -> (Rgb, Rgb) {
    let mut rng = Xorshift32::new(seed);
    (rng.next_rgb(), rng.next_rgb())
}

/// A pair of random gradient endpoints seeded from the clock.
#[must_use]
pub fn random_pair_now() -> (Rgb, Rgb) {
    random_pair(clock_seed())
}

/// A seed taken from the sub-second part of the system clock.
#[must_use]
pub fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |d| d.subsec_nanos() ^ 0x9e37_79b9)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
