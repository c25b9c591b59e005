//! Server configuration loading from config.toml
//!
//! The `[server]` table sets where the HTTP API listens and which browser
//! origins may call it. Every key is optional; a missing file is an error
//! only when it was asked for explicitly.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the HTTP listener and CORS policy
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g. "0.0.0.0")
    pub host: String,
    /// TCP port; overridden by the `PORT` environment variable
    pub port: u16,
    /// Origins allowed verbatim (e.g. `http://localhost:3000`)
    pub allowed_origins: Vec<String>,
    /// Host suffixes allowed for any scheme (e.g. `.vercel.app`)
    pub allowed_origin_suffixes: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            allowed_origin_suffixes: vec![".vercel.app".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the socket address string, honouring a `PORT` override.
    #[must_use]
    pub fn bind_address(&self) -> String {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(self.port);
        format!("{}:{port}", self.host)
    }

    /// Whether a browser `Origin` header value may call the API.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }
        let host = origin
            .split_once("://")
            .map_or(origin, |(_, rest)| rest)
            .split(['/', ':'])
            .next()
            .unwrap_or_default();
        self.allowed_origin_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from ./config.toml, falling back to defaults when the file is absent.
pub fn load_default_config() -> Result<Config> {
    if Path::new("config.toml").exists() {
        load_config("config.toml")
    } else {
        tracing::warn!("config.toml not found, using default server settings");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_server_config() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            allowed_origins = ["https://inventory.example.org"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://inventory.example.org".to_string()]
        );
        // Unspecified keys keep their defaults
        assert_eq!(
            config.server.allowed_origin_suffixes,
            vec![".vercel.app".to_string()]
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let path = std::env::temp_dir().join("chem_inventory_bad_config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let result = load_config(&path);
        assert!(matches!(result, Err(Error::Config { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_origin_matching() {
        let server = ServerConfig::default();
        assert!(server.is_origin_allowed("http://localhost:3000"));
        assert!(server.is_origin_allowed("https://my-app.vercel.app"));
        assert!(server.is_origin_allowed("https://preview-12.vercel.app:443"));
        assert!(!server.is_origin_allowed("http://localhost:4000"));
        assert!(!server.is_origin_allowed("https://vercel.app.evil.com"));
    }
}
