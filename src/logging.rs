use std::io::{stderr, stdout};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "FOLIO_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

struct LogTime;

impl FormatTime for LogTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        if cfg!(debug_assertions) {
            write!(w, "[{}]", chrono::Local::now().format("%m-%d %H:%M:%S"))
        } else {
            write!(w, "[{}]", chrono::Utc::now().to_rfc3339())
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a global fmt subscriber. Warnings and errors go to stderr,
/// everything else to stdout. Filtering follows `FOLIO_LOG`, `info` when
/// unset or invalid.
pub fn init_logger() -> Result<(), TryInitError> {
    let writer = stderr.with_max_level(Level::WARN).or_else(stdout);

    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_timer(LogTime),
        )
        .try_init()
}
