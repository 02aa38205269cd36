// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) request a graceful shutdown of the accept loop.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start the signal listener (Unix)
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => logger::log_shutdown("SIGTERM received"),
            _ = sigint.recv() => logger::log_shutdown("SIGINT received"),
        }

        // notify_one stores a permit if the loop is not waiting yet
        shutdown.notify_one();
    });
}

/// Start the signal listener (non-Unix)
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            return;
        }
        logger::log_shutdown("Ctrl+C received");
        shutdown.notify_one();
    });
}
