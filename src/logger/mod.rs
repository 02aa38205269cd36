//! Logger module
//!
//! Provides logging utilities for the API server including:
//! - Startup and shutdown lines
//! - Access logging with multiple formats
//! - Error, warning and handler fault logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use crate::routing::RouteTable;
use hyper::Method;
use std::error::Error;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    let current = if writer::is_initialized() {
        writer::get().level()
    } else {
        Level::Info
    };
    level <= current
}

/// Write to info/access log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn startup_line(port: u16) -> String {
    format!("API is running on http://localhost:{port}")
}

/// The single startup line, always on stdout regardless of level or log files
pub fn log_server_start(port: u16) {
    println!("{}", startup_line(port));
}

pub fn log_config(config: &Config) {
    if !enabled(Level::Debug) {
        return;
    }
    write_info(&format!(
        "[CONFIG] Bind: {}:{}",
        config.server.host, config.server.port
    ));
    match config.server.workers {
        Some(workers) => write_info(&format!("[CONFIG] Worker threads: {workers}")),
        None => write_info("[CONFIG] Worker threads: default (CPU cores)"),
    }
    write_info(&format!(
        "[CONFIG] Max body size: {} bytes",
        config.http.max_body_size
    ));
    write_info(&format!(
        "[CONFIG] Max connections: {:?}",
        config.performance.max_connections
    ));
}

pub fn log_routes(routes: &RouteTable) {
    if !enabled(Level::Debug) {
        return;
    }
    for route in routes.iter() {
        write_info(&format!(
            "[CONFIG] Route: {} {}",
            route.method,
            route.pattern.as_str()
        ));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(Level::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

/// Log a fault caught by the error handler
pub fn log_fault(method: &Method, path: &str, err: &dyn Error) {
    write_error(&format!("[ERROR] {method} {path} failed: {err}"));
    if let Some(source) = err.source() {
        write_error(&format!("        caused by: {source}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    if enabled(Level::Info) {
        write_access(&entry.format(format));
    }
}

pub fn log_shutdown(reason: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[Shutdown] {reason}, no longer accepting connections"));
    }
}
