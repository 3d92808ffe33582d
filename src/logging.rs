//! Console logging for the binary

use crate::error::AppError;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Logs go to stderr so stdout stays
/// parseable.
///
/// `RUST_LOG` takes precedence over the configured filter unless `verbose`
/// is set, in which case the configured filter is used as is.
pub fn init_logging(filter: &str, verbose: bool) -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(filter, verbose)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Config(format!("logging already initialised: {}", e)))
}

fn build_filter(filter: &str, verbose: bool) -> Result<EnvFilter, AppError> {
    let from_env = if verbose {
        None
    } else {
        EnvFilter::try_from_default_env().ok()
    };

    match from_env {
        Some(env_filter) => Ok(env_filter),
        None => EnvFilter::try_new(filter)
            .map_err(|e| AppError::Config(format!("invalid log filter '{}': {}", filter, e))),
    }
}
