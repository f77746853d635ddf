use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Install the global subscriber: a stderr `fmt` layer filtered by
/// `RUST_LOG` (falling back to `default_directive`), plus a debug-level
/// file layer when `TENEX_LOG_FILE` is set.
///
/// Calling this more than once is a no-op.
pub fn init_tracing_with_default(default_directive: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let file = std::env::var("TENEX_LOG_FILE").ok().and_then(|log_path| {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_path, e);
                None
            }
        }
    });

    let result = if let Some(file) = file {
        let file_layer = fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    // Already installed (tests, embedding binaries)
    let _ = result;
}
