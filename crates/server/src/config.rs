use compare::CompareConfig;
use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEMO_API_KEY: &str = "demo-key-12345";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Accepted API keys
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level / `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Install the Prometheus exporter and serve it on `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Directory holding `<reference_id>/` folders of generated creatives
    #[serde(default = "default_reference_root")]
    pub reference_root: PathBuf,

    #[serde(default)]
    pub perceptual: PerceptualConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            reference_root: default_reference_root(),
            perceptual: PerceptualConfig::default(),
            compare: CompareConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `server.{toml,yaml,json}` and `ADFP_SERVER__*`
    /// environment variables (env wins).
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(
                config::Environment::with_prefix("ADFP_SERVER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api_keys")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        if config.api_keys.is_empty() {
            tracing::warn!("No API keys configured, using demo key '{DEMO_API_KEY}'");
            config.api_keys.insert(DEMO_API_KEY.to_string());
        }

        Ok(config)
    }

    /// Reject settings the comparison layer cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.perceptual.validate()?;
        anyhow::ensure!(self.compare.max_images > 0, "compare.max_images must be > 0");
        anyhow::ensure!(
            self.compare.fetch_timeout_secs > 0,
            "compare.fetch_timeout_secs must be > 0"
        );
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reference_root() -> PathBuf {
    PathBuf::from("generated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.rate_limit_per_minute, 100);
        assert_eq!(cfg.reference_root, PathBuf::from("generated"));
        assert_eq!(cfg.compare.max_images, 10);
        assert_eq!(cfg.perceptual.similarity_threshold, 15);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn nested_sections_deserialize_with_defaults() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{"port": 9000, "compare": {"fetch_timeout_secs": 5}, "perceptual": {"algorithm": "dhash"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.compare.fetch_timeout_secs, 5);
        assert_eq!(cfg.compare.max_images, 10);
        assert_eq!(cfg.perceptual.algorithm, perceptual::HashAlgorithm::DHash);
        assert_eq!(cfg.perceptual.hash_size, 8);
    }

    #[test]
    fn invalid_perceptual_section_fails_validation() {
        let mut cfg = ServerConfig::default();
        cfg.perceptual.hash_size = 7;
        assert!(cfg.validate().is_err());
    }
}
