// SPDX-License-Identifier: MIT
//
// prism — a colour-gradient progress bar pinned to the bottom of the
// terminal.
//
// This binary is a demo driver for the prism-bar crate. It runs a bar over
// a simulated workload while printing ordinary output, so the scroll
// region can be seen doing its job:
//
//   ┌──────────────────────────────┐
//   │ -> 41                        │
//   │ -> 42                        │  ← stdout scrolls here
//   ├──────────────────────────────┤
//   │ [43/200] 21.5% | +1.08 -3.94 │  ← info line
//   │ ████████░░░░░░░░░░░░░░░░░░░░ │  ← gradient bar (stderr)
//   └──────────────────────────────┘
//
// Environment:
//
//   PRISM_GRADIENT  "<start>:<end>" hex colours; random when unset
//   PRISM_LOG       tracing filter (e.g. "debug"); logs go to
//                   $TMPDIR/prism.log, never to the terminal

use std::env;
use std::fs::OpenOptions;
use std::process;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use prism_bar::config::GRADIENT_VAR;
use prism_bar::{Options, ProgressBar, gradient};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_VAR: &str = "PRISM_LOG";
const LOG_FILE: &str = "prism.log";

const STEPS: u64 = 200;
const STEP_DELAY: Duration = Duration::from_millis(25);

/// Send tracing output to a file when `PRISM_LOG` is set. The terminal
/// belongs to the bar.
fn init_logging() {
    let Ok(filter) = env::var(LOG_VAR) else {
        return;
    };
    let path = env::temp_dir().join(LOG_FILE);
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Configured colours if `PRISM_GRADIENT` is set, otherwise a random pair.
fn options() -> prism_bar::Result<Options> {
    if env::var_os(GRADIENT_VAR).is_some() {
        return Options::from_env();
    }
    let (start, end) = gradient::random_pair_now();
    Ok(Options::with_colors(start, end))
}

fn main() {
    init_logging();

    let options = options().unwrap_or_else(|e| {
        eprintln!("prism: {e}");
        process::exit(2);
    });
    tracing::info!(start = %options.start, end = %options.end, "prism starting");

    let mut session = match ProgressBar::with_options(STEPS, options).and_then(ProgressBar::acquire) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("prism: {e}");
            process::exit(1);
        }
    };

    for i in 0..STEPS {
        println!("-> {i}");
        thread::sleep(STEP_DELAY);
        session.update(1);
    }
    session.release();
}
