use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };

    logger::init(&cfg)?;
    logger::log_config(&cfg);

    // Worker thread count comes from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg, handler::api::routes()));
    logger::log_routes(&state.routes);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::new(Notify::new());

    server::start_signal_handler(Arc::clone(&shutdown));
    logger::log_server_start(addr.port());

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            shutdown,
        ))
        .await
}
