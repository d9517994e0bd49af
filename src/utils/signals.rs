//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT
///
/// Falls back to Ctrl-C alone if the signal handler cannot be registered.
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to register signal handler: {}, listening for Ctrl-C only", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    signals.handle().close();
}
