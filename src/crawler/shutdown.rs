//! Graceful shutdown handler.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `token` on the first Ctrl+C (or SIGTERM on Unix).
/// A second Ctrl+C exits immediately.
pub fn spawn_shutdown_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::warn!("Stop requested, finishing the current URL before exiting");
        tracing::warn!("Press Ctrl+C again to force quit");
        token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nForce quit requested, exiting immediately...");
            std::process::exit(130);
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::debug!("SIGTERM handler unavailable: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
