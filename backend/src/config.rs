//! Server configuration loaded from environment variables.
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `MODEL_URL`: Prediction endpoint (default: http://flask_ml_service:5000/predict)
//! - `REPOSITORY_CONFIG`: Optional path to a repository TOML file

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL_URL: &str = "http://flask_ml_service:5000/predict";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_url: String,
    /// When unset the repository is chosen from the environment.
    pub repository_config: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_url: DEFAULT_MODEL_URL.to_string(),
            repository_config: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            model_url: get("MODEL_URL").unwrap_or(defaults.model_url),
            repository_config: get("REPOSITORY_CONFIG").map(PathBuf::from),
        }
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("MODEL_URL", "http://localhost:5000/predict"),
            ("REPOSITORY_CONFIG", "/etc/registry/repository.toml"),
        ]));
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.model_url, "http://localhost:5000/predict");
        assert_eq!(
            config.repository_config,
            Some(PathBuf::from("/etc/registry/repository.toml"))
        );
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "eighty"), ("HOST", "")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
