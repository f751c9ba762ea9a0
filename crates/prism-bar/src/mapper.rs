//! Progress → column mapping.
//!
//! One rule for every caller:
//!
//! ```text
//! column = ceil(completed / total · width)      in [0, width]
//! ```
//!
//! The bar is exactly `width` cells, columns `0..width`. A column value is
//! the exclusive end of the drawn span: `0` means nothing drawn, `width`
//! means the whole row. Ceiling rather than rounding means any progress at
//! all lights at least one cell, and only `completed == total` fills the
//! last one.
//!
//! The arithmetic is integer (`u128`), so there is no float drift at the
//! boundaries and no overflow for any `u64` progress against a `u16` width.

/// Map `completed` units out of `total` to a bar column in `[0, width]`.
///
/// `completed` above `total` is clamped. A `total` of zero maps everything
/// to column zero (such a bar can't be constructed, but the function is
/// total).
#[must_use]
pub fn column_for(completed: u64, total: u64, width: u16) -> u16 {
    if total == 0 {
        return 0;
    }
    let completed = u128::from(completed.min(total));
    let total = u128::from(total);
    let scaled = completed * u128::from(width);
    let column = scaled.div_ceil(total);
    // completed <= total, so column <= width.
    u16::try_from(column).unwrap_or(width)
}
