//! Graceful shutdown handling
//!
//! A coordinator flips a watch channel once; every clone of its signal sees
//! the flip. The server stops accepting on the flip and gets a bounded window
//! to finish in-flight requests.

use std::future::IntoFuture;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Cloneable view of the shutdown state
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been triggered (or the coordinator is gone).
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|down| *down).await;
    }
}

/// Owns the shutdown flag
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger shutdown. Idempotent.
    pub fn shutdown(&self) {
        let changed = self.tx.send_if_modified(|down| !std::mem::replace(down, true));
        if changed {
            info!("Initiating graceful shutdown...");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes on SIGINT or SIGTERM.
///
/// A handler that fails to install is logged and never fires; the other one
/// still does.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

// ============================================================================
// Shutdown-Aware Server
// ============================================================================

/// Serve `router` until `shutdown` fires, then drain for at most `drain_timeout`.
///
/// Returns `Ok(())` when the drain window expires with requests still open;
/// those connections are dropped.
pub async fn serve_with_shutdown(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    shutdown: ShutdownSignal,
    drain_timeout: Duration,
) -> std::io::Result<()> {
    let mut stop_accepting = shutdown.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { stop_accepting.wait().await })
        .into_future();
    tokio::pin!(server);

    let mut shutdown = shutdown;
    tokio::select! {
        result = &mut server => return result,
        _ = shutdown.wait() => {}
    }

    info!(timeout = ?drain_timeout, "Waiting for in-flight requests to complete...");
    match tokio::time::timeout(drain_timeout, server).await {
        Ok(result) => {
            info!("Graceful shutdown complete");
            result
        }
        Err(_) => {
            warn!("Timeout waiting for requests to drain");
            Ok(())
        }
    }
}
