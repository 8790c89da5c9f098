//! Tracing subscriber setup shared by the phyto binaries
//!
//! The subscriber is installed before the config file is read so config
//! loading is logged; the configured level is applied afterwards.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter used until the config file has been read
pub const DEFAULT_LEVEL: &str = "info";

/// Handle to the installed filter
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Install the global subscriber at `RUST_LOG` or [`DEFAULT_LEVEL`]
pub fn init_tracing() -> Result<LogHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(DEFAULT_LEVEL), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| Error::Config(format!("Tracing already initialized: {}", e)))?;

    Ok(LogHandle {
        filter: handle,
        from_env,
    })
}

impl LogHandle {
    /// Switch to the configured level; `RUST_LOG` keeps priority
    pub fn apply(&self, config: &LoggingConfig) -> Result<()> {
        if self.from_env {
            return Ok(());
        }

        let filter = EnvFilter::try_new(&config.level)
            .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))?;
        self.filter
            .reload(filter)
            .map_err(|e| Error::Config(format!("Log filter reload failed: {}", e)))
    }
}
