//! Configuration management for PaperGraph services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// arXiv export API configuration
    pub arxiv: ArxivConfig,

    /// Cache tier configuration
    pub cache: CacheConfig,

    /// Retry policy configuration
    pub retry: RetryConfig,

    /// Network discovery bounds
    pub discovery: DiscoveryConfig,

    /// Outline generation configuration
    pub outline: OutlineConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArxivConfig {
    /// Base URL of the export API
    #[serde(default = "default_arxiv_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_arxiv_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_arxiv_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// TTL for externally-sourced metadata and query results, in seconds
    #[serde(default = "default_metadata_ttl")]
    pub metadata_ttl_secs: u64,

    /// Sweep interval for the metadata tier, in seconds
    #[serde(default = "default_metadata_sweep")]
    pub metadata_sweep_secs: u64,

    /// TTL for derived artifacts (generated flowcharts), in seconds
    #[serde(default = "default_derived_ttl")]
    pub derived_ttl_secs: u64,

    /// Sweep interval for the derived tier, in seconds
    #[serde(default = "default_derived_sweep")]
    pub derived_sweep_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per operation (not retries)
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles each attempt after
    #[serde(default = "default_retry_delay_ms")]
    pub initial_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// Maximum traversal depth from the root paper
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum related papers fetched per expansion
    #[serde(default = "default_max_branch")]
    pub max_branch: usize,

    /// Maximum concurrently-expanding nodes per traversal
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutlineConfig {
    /// API key for the chat-completion service
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_outline_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_outline_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_outline_timeout")]
    pub timeout_secs: u64,

    /// Paper content is truncated to this many characters before prompting
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Token budget for the completion
    #[serde(default = "default_outline_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_outline_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3001 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_arxiv_base_url() -> String { "http://export.arxiv.org/api/query".to_string() }
fn default_arxiv_timeout() -> u64 { 5 }
fn default_arxiv_user_agent() -> String { format!("papergraph/{}", env!("CARGO_PKG_VERSION")) }
fn default_metadata_ttl() -> u64 { 3600 }
fn default_metadata_sweep() -> u64 { 600 }
fn default_derived_ttl() -> u64 { 300 }
fn default_derived_sweep() -> u64 { 60 }
fn default_retry_attempts() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 1000 }
fn default_max_depth() -> usize { 4 }
fn default_max_branch() -> usize { 8 }
fn default_max_in_flight() -> usize { 16 }
fn default_outline_api_base() -> String { "https://api.perplexity.ai".to_string() }
fn default_outline_model() -> String { "llama-3.1-sonar-large-128k-online".to_string() }
fn default_outline_timeout() -> u64 { 30 }
fn default_max_content_chars() -> usize { 5000 }
fn default_outline_max_tokens() -> u32 { 2000 }
fn default_outline_temperature() -> f32 { 0.2 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=3002
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl CacheConfig {
    pub fn metadata_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata_ttl_secs)
    }

    pub fn metadata_sweep(&self) -> Duration {
        Duration::from_secs(self.metadata_sweep_secs)
    }

    pub fn derived_ttl(&self) -> Duration {
        Duration::from_secs(self.derived_ttl_secs)
    }

    pub fn derived_sweep(&self) -> Duration {
        Duration::from_secs(self.derived_sweep_secs)
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/papergraph".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            arxiv: ArxivConfig {
                base_url: default_arxiv_base_url(),
                timeout_secs: default_arxiv_timeout(),
                user_agent: default_arxiv_user_agent(),
            },
            cache: CacheConfig {
                metadata_ttl_secs: default_metadata_ttl(),
                metadata_sweep_secs: default_metadata_sweep(),
                derived_ttl_secs: default_derived_ttl(),
                derived_sweep_secs: default_derived_sweep(),
            },
            retry: RetryConfig {
                max_attempts: default_retry_attempts(),
                initial_delay_ms: default_retry_delay_ms(),
            },
            discovery: DiscoveryConfig {
                max_depth: default_max_depth(),
                max_branch: default_max_branch(),
                max_in_flight: default_max_in_flight(),
            },
            outline: OutlineConfig {
                api_key: None,
                api_base: default_outline_api_base(),
                model: default_outline_model(),
                timeout_secs: default_outline_timeout(),
                max_content_chars: default_max_content_chars(),
                max_tokens: default_outline_max_tokens(),
                temperature: default_outline_temperature(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
            },
        }
    }
}
