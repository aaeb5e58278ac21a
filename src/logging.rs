//! Diagnostic logging setup.
//!
//! Events go to stderr so they never interleave with the transcript on
//! stdout. The filter comes from `RELAY_LOG` (e.g. `RELAY_LOG=relay=debug`).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, ENV_LOG};

pub fn init() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
