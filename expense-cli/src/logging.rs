use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Accept both tracing names and the upper-case WARNING/CRITICAL spellings.
pub fn filter_directive(log_level: &str) -> String {
    let upper = log_level.trim().to_uppercase();
    match upper.as_str() {
        "TRACE" => "trace".to_string(),
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARN" | "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.trim().to_string(),
    }
}

/// Install the stderr subscriber. Unknown directives fall back to `info`.
pub fn setup_logging(log_level: &str) {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();
}
