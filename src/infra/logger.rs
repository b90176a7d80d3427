// src/infra/logger.rs — Structured logging with tracing
//
// Output goes to stderr, except while a full-screen UI owns the terminal.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt, EnvFilter};

static MUTED: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber. `TASKSPHERE_LOG` wins over `RUST_LOG`,
/// which wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("TASKSPHERE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(log_writer)
        .compact()
        .init();
}

/// Drop log output until [`unmute`] is called.
pub fn mute() {
    MUTED.store(true, Ordering::Relaxed);
}

pub fn unmute() {
    MUTED.store(false, Ordering::Relaxed);
}

pub fn is_muted() -> bool {
    MUTED.load(Ordering::Relaxed)
}

fn log_writer() -> Box<dyn Write> {
    if is_muted() {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    }
}
