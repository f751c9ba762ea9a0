// SPDX-License-Identifier: MIT
//
// prism-term — Terminal plumbing for prism.
//
// Everything the progress bar needs from the terminal and nothing more:
// byte-exact ANSI escape generation, 24-bit color, a single-write output
// buffer, geometry queries with a fallback, process-wide resize/interrupt
// notifications, and an emergency restore that survives panics and Ctrl-C.
//
// Like the rest of the workspace this crate talks to the terminal directly
// with escape sequences and a few POSIX calls rather than through a TUI
// framework. The bar lives in two reserved rows at the bottom of an
// ordinary scrolling terminal; it never takes over the screen.

pub mod ansi;
pub mod color;
pub mod output;
pub mod signal;
pub mod style;
pub mod terminal;

pub use color::{CellColor, Rgb};
pub use signal::Notification;
pub use terminal::Size;
