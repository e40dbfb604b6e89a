use color_eyre::eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install error reporting and the tracing subscriber. Call once at startup.
pub fn init() -> Result<()> {
    install_error_reporting()?;
    init_tracing()
}

/// Colored error reports with span traces from [`ErrorLayer`].
pub fn install_error_reporting() -> Result<()> {
    color_eyre::install()
}

/// Compact fmt output filtered by `RUST_LOG` (default `info`), with span
/// traces captured for errors. Fails if a global subscriber is already set.
pub fn init_tracing() -> Result<()> {
    let fmt_layer = fmt::layer().compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
