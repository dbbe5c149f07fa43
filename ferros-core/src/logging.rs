//! Logging initialization built on `tracing`.
//!
//! Log output goes to stderr through `tracing-subscriber`, filtered by
//! `RUST_LOG` (default `info`). Calls through the `log` crate are bridged
//! into tracing so dependencies using either facade end up in one stream.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize logging for this process.
///
/// Idempotent: only the first call has an effect.
pub fn init_logging() {
    LOGGING_INITIALIZED.get_or_init(|| {
        tracing_log::LogTracer::init().ok();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging();
        init_logging();
        tracing::info!("logging initialized");
    }
}
