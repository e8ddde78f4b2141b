//! Tracing setup.
//!
//! The TUI owns the terminal, so log records are appended to a file in the
//! data directory. `RUST_LOG` controls the filter; the default is `info`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber writing to `log_path`.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(log_path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
