//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
///
/// Like [`init_with_level`], a second call leaves the first logger in place.
pub fn init() {
    if env_logger::try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` still wins when it is set. Calling this more than once, or
/// after [`init`], leaves the first logger in place.
pub fn init_with_level(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_with_level("debug");
        init_with_level("trace");
        debug!("still logging");
    }

    #[test]
    fn test_init_after_init_does_not_panic() {
        init();
        init();
        init_with_level("info");
        info!("still logging");
    }
}
