//! Tracing setup shared by the framefit binaries.
//!
//! Diagnostics go to stderr so stdout stays clean for command output
//! and piping. Filter precedence: `FRAMEFIT_LOG`, then `RUST_LOG`, then
//! the configured level.

use crate::config::LoggingConfig;

/// Environment variable overriding the configured log filter.
pub const LOG_ENV_VAR: &str = "FRAMEFIT_LOG";

/// Install the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let builder = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::new(filter_directives(config)))
        .with_writer(std::io::stderr);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish()).ok();
    }
}

/// Initialize logging with the default configuration, for binaries that
/// take no logging settings of their own.
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

fn filter_directives(config: &LoggingConfig) -> String {
    std::env::var(LOG_ENV_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| config.level.clone())
}
