//! Error type for the progress bar engine.
//!
//! Only construction and acquisition can fail. Once a session is active,
//! rendering problems are logged and swallowed: a progress bar must never
//! take down the work it is reporting on.

use std::io;

use thiserror::Error;

/// Errors raised while configuring or acquiring a progress bar.
#[derive(Debug, Error)]
pub enum Error {
    /// The bar was constructed with a total of zero.
    #[error("total must be a positive number of units")]
    InvalidTotal,

    /// A gradient was requested with zero steps.
    #[error("gradient needs at least one step")]
    InvalidSteps,

    /// A configured color could not be parsed.
    #[error("invalid color {0:?}: expected #RGB or #RRGGBB")]
    InvalidColor(String),

    /// The terminal could not be acquired.
    #[error("failed to acquire terminal: {0}")]
    Io(#[from] io::Error),
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
