// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

impl Config {
    /// Load configuration from the default config file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. Environment variables prefixed with `API_` override it,
    /// using `__` between nested keys (e.g. `API_SERVER__PORT=8080`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.max_body_size", 102_400)? // 100KB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 102_400);
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
