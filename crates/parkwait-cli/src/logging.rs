use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

// Timestamp format: 2026-02-14 19:44:09.123 -08:00
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// Log to the console and, without colours, to `log_file` (appended).
///
/// `RUST_LOG` overrides `level` when set.
pub fn init(level: &str, utc: bool, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if utc {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_timer(ChronoUtc::new(TIME_FORMAT.to_string())))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()))
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_timer(ChronoLocal::new(TIME_FORMAT.to_string())))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    Ok(())
}
