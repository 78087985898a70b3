//! Structured logging for the native library
//!
//! A `tracing-subscriber` fmt subscriber writing to stderr is installed the
//! first time any exported function runs. The level filter sits behind a
//! reload layer so hosts can change it at runtime with
//! `stash_set_log_level`. If the host process already installed a global
//! subscriber, ours is silently skipped.

use std::sync::OnceLock;

use stash_core::{Config, Error, LogFormat, LogLevel, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the subscriber once, using `config` for the initial settings
pub fn init(config: &Config) -> &'static reload::Handle<EnvFilter, Registry> {
    FILTER.get_or_init(|| {
        let (filter, handle) = reload::Layer::new(EnvFilter::new(config.log_level.as_str()));

        let (json, compact) = match config.log_format {
            LogFormat::Json => (Some(fmt::layer().json().with_writer(std::io::stderr)), None),
            LogFormat::Compact => (
                None,
                Some(fmt::layer().compact().with_writer(std::io::stderr)),
            ),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(compact)
            .try_init();

        handle
    })
}

/// Change the active log level
pub fn set_level(level: LogLevel) -> Result<()> {
    match init(&crate::gateway::current_config()).reload(EnvFilter::new(level.as_str())) {
        Ok(()) => {
            tracing::info!(%level, "log level changed");
            Ok(())
        }
        // the host installed its own subscriber; its filter is not ours to change
        Err(e) if e.is_dropped() => Ok(()),
        Err(e) => Err(Error::internal(format!("failed to change log level: {}", e))),
    }
}

/// Level currently applied by the filter, if the subscriber is installed
pub fn current_level() -> Option<String> {
    FILTER
        .get()
        .and_then(|handle| handle.with_current(|filter| filter.to_string()).ok())
}
