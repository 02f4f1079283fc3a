use tracing_subscriber::{
    Layer, filter::LevelFilter, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

fn file_layer<S>(log_dir: &str, file_name: &str, level: LevelFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, file_name))
        .with_ansi(false)
        .with_filter(level)
}

/// Initialize console logging plus daily-rotating file logging with level
/// separation. Files are created as logs/info.log.2024-12-22 and so on.
/// RUST_LOG controls the overall filter, defaulting to info.
pub fn init(log_dir: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer(log_dir, "info.log", LevelFilter::INFO))
        .with(file_layer(log_dir, "warn.log", LevelFilter::WARN))
        .with(file_layer(log_dir, "error.log", LevelFilter::ERROR))
        .with(file_layer(log_dir, "debug.log", LevelFilter::DEBUG))
        .init();
}
