use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the `-d` count picks the level.
pub fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    if let Err(error) = result {
        eprintln!("Error: Failed to set up logging: {error}");
    }
}
