use tokio::net::TcpListener;
use tokio::signal;

use crate::app::{AppContext, LogControl, NotificationsError, Result};
use crate::config::Config;
use crate::http::build_router;

/// Run the HTTP service until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, logs: LogControl) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let router = build_router(&ctx, logs);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        port = config.port,
        api_host = %config.api_host,
        limit = config.limit,
        cache_delay_secs = config.cache_delay_secs,
        "Starting server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| NotificationsError::Config(e.to_string()))?;
    print!("{}", rendered);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
