//! Logging initialization for the binary.
//!
//! Logs go to stderr so stdout carries only the run output. `RUST_LOG` sets the
//! filter (default `warn`); `--verbose` raises heddle's own modules to `debug`.
//! When `LOG_FILE` is set, logs are appended to that file instead.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn filter(verbose: bool) -> EnvFilter {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    if verbose {
        EnvFilter::new(format!("{},heddle=debug,heddle_cli=debug", base))
    } else {
        EnvFilter::new(base)
    }
}

pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_filter(filter(verbose));
        tracing_subscriber::registry().with(layer).try_init()?;
        tracing::info!(path = %path, "heddle logging to file");
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter(verbose));
        tracing_subscriber::registry().with(layer).try_init()?;
    }
    Ok(())
}
