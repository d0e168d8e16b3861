use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize structured logging based on configuration.
///
/// Supports both JSON (production) and pretty (development) formats. The
/// `RUST_LOG` environment variable overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format.as_str() == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
    } else {
        registry
            .with(fmt::layer().with_target(true))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
    }

    Ok(())
}
