//! Signal handling for graceful shutdown

use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::{error, info};

/// Wait for shutdown signals (SIGTERM, SIGINT, SIGQUIT)
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGQUIT,
    ]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to register signal handler: {}, falling back to Ctrl-C", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}
