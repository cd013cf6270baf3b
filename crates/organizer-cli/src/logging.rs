use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "logs/organizer.log";

/// Directory and file name for the log file. `LOG_FILE_PATH` may be
/// relative or absolute; a bare file name lands in the working directory.
fn split_log_path(raw: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(raw);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("organizer.log"));
    (dir, file)
}

/// Console plus file logging. `TRACING_LEVEL` takes an `EnvFilter`
/// directive, e.g. `info` or `organizer_core=debug`. Keep the returned
/// guard alive so buffered file output is flushed on exit.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let raw_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file) = split_log_path(&raw_path);
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, &log_file));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter_layer)
        .init();

    info!(
        "Logging to stdout and {}",
        log_dir.join(&log_file).display()
    );

    guard
}
