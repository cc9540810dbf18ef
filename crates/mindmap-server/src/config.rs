//! Configuration file parsing for the server.
//!
//! Loads bind address, CORS origins and the extractor settings from TOML.
//! The backend credential never lives in the file; it is applied afterwards
//! from the command line or environment.

use mindmap_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field has an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    pub bind_port: u16,

    /// Allowed CORS origins; `"*"` allows any
    pub cors_origins: Vec<String>,

    /// Extraction pipeline settings
    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 5000,
            cors_origins: vec!["*".to_string()],
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply the backend credential, ignoring blank values
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.extractor.api_key = Some(key);
        }
        self
    }

    /// Check the configuration before anything is started
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extractor.require_api_key && self.extractor.api_key.is_none() {
            return Err(ConfigError::MissingField(
                "api_key (pass --api-key or set OPENROUTER_API_KEY)".to_string(),
            ));
        }
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::MissingField("bind_address".to_string()));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// Create a configuration for a local backend, for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 5000,
            cors_origins: vec!["*".to_string()],
            extractor: ExtractorConfig::local("http://127.0.0.1:1234/v1/chat/completions"),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_extractor::InstructionVariant;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 5000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_refuses_to_start_without_key() {
        let config = ServerConfig::default();
        match config.validate() {
            Err(ConfigError::MissingField(field)) => assert!(field.starts_with("api_key")),
            other => panic!("Expected MissingField, got {:?}", other),
        }

        let config = ServerConfig::default().with_api_key(Some("sk-or-test".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let config = ServerConfig::default().with_api_key(Some("  ".to_string()));
        assert!(config.extractor.api_key.is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            cors_origins = ["http://localhost:3000", "https://tamilmindmapgenerator.com"]

            [extractor]
            backend_url = "http://192.168.1.7:1234/v1/chat/completions"
            model = "meta-llama-3.1-8b-instruct"
            require_api_key = false
            instruction = "hierarchical"
            timeout_secs = 45
        "#;

        let config = ServerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.extractor.model, "meta-llama-3.1-8b-instruct");
        assert_eq!(config.extractor.instruction, InstructionVariant::Hierarchical);
        assert_eq!(config.extractor.timeout_secs, 45);
        assert_eq!(config.extractor.max_tokens, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_extractor_value() {
        let toml = r#"
            [extractor]
            require_api_key = false
            temperature = 9.0
        "#;

        let config = ServerConfig::from_toml_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindmap.toml");
        std::fs::write(&path, "bind_port = 8081\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_port, 8081);
        assert_eq!(config.bind_address, "0.0.0.0");

        assert!(matches!(
            ServerConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileRead(_))
        ));
    }
}
