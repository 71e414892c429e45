//! # Configuration
//!
//! Command line flags, each with an environment variable fallback.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// The database URL used when none is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite:books.db";

#[derive(Debug, Clone, Parser)]
#[command(name = "books-backend", version, about = "REST API for managing book records")]
pub struct Config {
    /// SQLite database URL; the file is created if it does not exist
    #[arg(long, env = "BOOKS_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "BOOKS_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind the HTTP listener to
    #[arg(long, env = "BOOKS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Only allow cross-origin requests from this origin (any origin if unset)
    #[arg(long, env = "BOOKS_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "BOOKS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["books-backend"]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.socket_addr(), SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert!(config.cors_origin.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "books-backend",
            "--database-url",
            "sqlite:other.db",
            "--host",
            "0.0.0.0",
            "--port",
            "8081",
            "--cors-origin",
            "http://localhost:8080",
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite:other.db");
        assert_eq!(config.socket_addr(), SocketAddr::from(([0, 0, 0, 0], 8081)));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["books-backend", "--port", "not-a-port"]).is_err());
    }
}
