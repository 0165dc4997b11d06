use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use crate::app::{NotificationsError, Result};

/// Levels that can be switched to at runtime.
pub const RUNTIME_LEVELS: [&str; 2] = ["debug", "info"];

/// Handle to the installed log filter.
#[derive(Clone)]
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogControl {
    pub fn new(handle: reload::Handle<EnvFilter, Registry>) -> Self {
        Self { handle }
    }

    /// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
    pub fn init(default_level: &str) -> Self {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let (filter, handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();

        Self::new(handle)
    }

    pub fn set_level(&self, level: &str) -> Result<()> {
        if !RUNTIME_LEVELS.contains(&level) {
            return Err(NotificationsError::InvalidRequest(format!(
                "Please specify one of [{}]",
                RUNTIME_LEVELS.join(", ")
            )));
        }

        self.handle
            .reload(EnvFilter::new(level))
            .map_err(|e| NotificationsError::Config(format!("failed to reload log filter: {}", e)))?;

        tracing::info!(level = %level, "Log level updated");
        Ok(())
    }

    pub fn current(&self) -> Option<String> {
        self.handle.with_current(|f| f.to_string()).ok()
    }
}
