//! Graceful shutdown

use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Handler for graceful shutdown
///
/// Will listen to Ctrl+C and the terminate signal, then cancels `shutdown` so background tasks
/// stop along with the server
pub async fn handler(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {err}");

            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("Could not listen for the terminate signal: {err}");

                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = shutdown.cancelled() => {},
    }

    tracing::info!("Terminate signal received, starting graceful shutdown");

    shutdown.cancel();
}
