//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=windmap::particles=debug`.
///
/// # Example
/// ```no_run
/// windmap::core::logging::init();
/// log::info!("Overlay started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .init();
}

/// Like [`init`], but safe to call more than once (tests, embedding hosts).
pub fn try_init() -> bool {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .try_init()
    .is_ok()
}
