// Server module entry
// Provides listener creation, the accept loop, connection handling and signal handling

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::start_signal_handler;
