use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,hypercable_icme=debug";

/// Installs the fmt subscriber used by the command-line tools.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once is a
/// no-op.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
