use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "SKYNET_DEBUG";

fn level_for(debug: Option<&str>) -> &'static str {
    match debug.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if matches!(value.as_str(), "1" | "y" | "yes") => "debug",
        _ => "info",
    }
}

/// Installs a stderr `tracing` subscriber for this crate's events.
///
/// The level is `info`, or `debug` when `SKYNET_DEBUG` is `1`, `y` or `yes`.
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging() -> bool {
    let debug = std::env::var(DEBUG_ENV).ok();
    let level = level_for(debug.as_deref());
    let filter = EnvFilter::new(format!("skynet_application={level}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
