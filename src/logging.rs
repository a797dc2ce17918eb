//! Logger bootstrap for the desktop binary.

use log::info;

/// Initialize `env_logger` with `default_level` unless `RUST_LOG` is set.
/// Calling it again is harmless.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
    {
        info!(
            "gantt-editor {} starting on {}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
    }
}
