//! Gateway configuration (objgate.toml)
//!
//! ```toml
//! address = "127.0.0.1"
//! port = 25333
//! auth_token = "secret"
//! log_filter = "objgate=debug"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 25333;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value is out of range or malformed
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to listen on
    pub address: String,

    /// Port to listen on; 0 picks a free port
    pub port: u16,

    /// Shared secret every connection must present first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Log filter directive, used when the environment sets none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            auth_token: None,
            log_filter: None,
        }
    }
}

impl GatewayConfig {
    /// Parse a configuration from a file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the address parses and the token is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if let Some(token) = &self.auth_token {
            if token.is_empty() {
                return Err(ConfigError::ValidationError(
                    "auth_token cannot be empty".to_string(),
                ));
            }
            if token.contains('\n') || token.contains('\r') {
                return Err(ConfigError::ValidationError(
                    "auth_token cannot contain line breaks".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.address.parse().map_err(|_| {
            ConfigError::ValidationError(format!("Invalid address: {}", self.address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether connections must authenticate
    pub fn requires_auth(&self) -> bool {
        self.auth_token.is_some()
    }
}
