use log::LevelFilter;

/// Initialize logging using env_logger.
///
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=s3hero_core=debug s3hero profile list`.
/// Otherwise only warnings are shown, or everything down to debug when `verbose`.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
