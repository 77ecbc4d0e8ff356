//! Configuration for the product analyzer
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `ANALYZER__SECTION__KEY` environment variables. The LLM credential can also
//! come from the variable named by `llm.api_key_env`.

use crate::error::{AnalyzerError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A missing .env file is not an error
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("ANALYZER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AnalyzerError::Configuration(format!("Failed to read configuration: {}", e)))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AnalyzerError::Configuration(format!("Invalid configuration: {}", e)))?;

        config.llm.resolve_api_key();
        config.validate()?;

        Ok(config)
    }

    /// Reject values that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_url.trim().is_empty() {
            return Err(AnalyzerError::Configuration("llm.api_url cannot be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AnalyzerError::Configuration("llm.timeout_secs must be positive".to_string()));
        }
        if self.llm.max_concurrent_requests == 0 {
            return Err(AnalyzerError::Configuration(
                "llm.max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generative-text service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions endpoint (OpenAI compatible)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; never logged
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Environment variable consulted when `api_key` is not set
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound for a single model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model calls allowed in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    45
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl LlmConfig {
    /// Fill `api_key` from `api_key_env` when it was not configured directly
    pub fn resolve_api_key(&mut self) {
        if self.has_api_key() {
            return;
        }
        if let Ok(val) = std::env::var(&self.api_key_env) {
            if !val.trim().is_empty() {
                self.api_key = Some(SecretString::new(val));
            }
        }
    }

    /// Whether a non-blank credential is present
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .map(|key| !key.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(key.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Report generation defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_version")]
    pub report_version: String,

    /// Use the professional schema when a request does not say otherwise
    #[serde(default)]
    pub default_professional: bool,
}

fn default_report_version() -> String {
    "1.0".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_version: default_report_version(),
            default_professional: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout(), Duration::from_secs(45));
        assert_eq!(config.llm.max_concurrent_requests, 1);
        assert_eq!(config.report.report_version, "1.0");
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_is_not_a_key() {
        let config = LlmConfig::default().with_api_key("   ");
        assert!(!config.has_api_key());

        let config = LlmConfig::default().with_api_key("sk-test");
        assert!(config.has_api_key());
    }

    #[test]
    fn test_api_key_resolved_from_named_env_var() {
        let mut config = LlmConfig {
            api_key_env: "PRODUCT_ANALYZER_TEST_KEY_RESOLVE".to_string(),
            ..LlmConfig::default()
        };
        std::env::set_var("PRODUCT_ANALYZER_TEST_KEY_RESOLVE", "sk-from-env");
        config.resolve_api_key();
        std::env::remove_var("PRODUCT_ANALYZER_TEST_KEY_RESOLVE");

        assert_eq!(config.api_key.unwrap().expose_secret(), "sk-from-env");
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let config = LlmConfig::default().with_api_key("sk-very-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("product-analyzer-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [llm]
            model = "gpt-4o"
            timeout_secs = 30

            [server]
            port = 9090

            [report]
            default_professional = true
            "#
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.server.port, 9090);
        assert!(config.report.default_professional);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(AnalyzerError::Configuration(_))));
    }
}
