// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Accept loop
///
/// Each accepted connection is served on its own local task. Returns once
/// `shutdown` is notified; connections already accepted keep running.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown("Shutdown requested");
                return Ok(());
            }
        }
    }
}
