use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "library_catalog=warn";
const VERBOSE_FILTER: &str = "library_catalog=debug,info";

/// Picks the filter: `RUST_LOG` first, then `--verbose`, then the configured level.
fn build_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else {
            match level {
                Some(level) => EnvFilter::try_new(format!("library_catalog={}", level))
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
                None => EnvFilter::new(DEFAULT_FILTER),
            }
        }
    })
}

// Logs go to stderr; stdout belongs to the interactive menu.
pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
