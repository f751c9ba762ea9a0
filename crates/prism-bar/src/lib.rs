//! prism-bar — a live color-gradient progress bar for the terminal.
//!
//! The bar sits in the bottom row with an info line above it. Both are
//! kept out of the terminal's scroll region, so ordinary output keeps
//! scrolling above them.
//!
//! ```no_run
//! use prism_bar::ProgressBar;
//!
//! let mut session = ProgressBar::new(100)?.acquire()?;
//! for i in 0..100 {
//!     println!("-> {i}");
//!     session.update(1);
//! }
//! session.release();
//! # Ok::<(), prism_bar::Error>(())
//! ```
//!
//! Module map, leaf first:
//!
//! - [`gradient`]: interpolating the color run
//! - [`mapper`]: progress to column
//! - [`info`]: the counts and times above the bar
//! - [`renderer`]: the escape sequences for each visual change
//! - [`backend`]: device, geometry and notifications
//! - [`coordinator`]: resize recovery and interrupt shutdown
//! - [`session`]: acquire, update, release

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gradient;
pub mod info;
pub mod mapper;
pub mod renderer;
pub mod session;

pub use backend::{Backend, MemoryBackend, TtyBackend};
pub use config::Options;
pub use error::{Error, Result};
pub use gradient::{Gradient, interpolate};
pub use mapper::column_for;
pub use session::{Phase, ProgressBar, Session};
