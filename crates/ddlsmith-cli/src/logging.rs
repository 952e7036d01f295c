use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::CliError;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions<'a> {
    /// Number of `-v` flags.
    pub verbosity: u8,
    pub json: bool,
    /// Append log lines here instead of stderr.
    pub file: Option<&'a Path>,
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init_logging(options: LogOptions<'_>) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbosity)));
    let writer = log_writer(options.file)?;

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(options.file.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}

/// stderr, or the log file opened for appending. Every event writes through
/// the same shared handle.
fn log_writer(file: Option<&Path>) -> io::Result<BoxMakeWriter> {
    Ok(match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    })
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
