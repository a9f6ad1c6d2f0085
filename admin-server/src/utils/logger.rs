//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the configured level. Output goes to stdout (plain or
//! JSON) and, with a log directory, to a daily rolling file as well.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(level: &str) -> String {
    format!("admin_server={level},tower_http=info")
}

/// Initialize the global subscriber
///
/// The returned guard flushes the file writer; keep it alive until exit.
pub fn init_logger(level: &str, json: bool, log_dir: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let stdout = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .boxed()
    };
    layers.push(stdout);

    let mut guard = None;
    if let Some(dir) = log_dir {
        let path = Path::new(dir);
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create log directory {}", path.display()))?;

        let file_appender = tracing_appender::rolling::daily(path, "admin-server.log");
        let (writer, file_guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = if json {
            fmt::layer().json().with_writer(writer).boxed()
        } else {
            fmt::layer().with_ansi(false).with_target(true).with_writer(writer).boxed()
        };
        layers.push(file_layer);
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "admin_server=debug,tower_http=info");
    }
}
