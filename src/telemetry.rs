use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

pub const DEFAULT_LOG_FILTER: &str = "info,proctor_dashboard=debug,tower_http=info";

/// Installs the global subscriber: `RUST_LOG` if set, otherwise the default filter.
pub fn init_tracing() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = fmt::layer().with_target(true);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("tracing initialized");
    Ok(())
}
