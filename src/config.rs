//! Settings file loading and validation

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kubeview_k8s::ClusterOptions;
use kubeview_server::ServerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cluster: ClusterOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Check every field, collecting all problems
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let server = &self.server;

        if server.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.bind_address '{}' is not a socket address",
                server.bind_address
            ));
        }
        if server.request_timeout_secs == 0 {
            errors.push("server.request_timeout_secs must be greater than 0".to_string());
        }
        if server.default_tail_lines < 0 {
            errors.push("server.default_tail_lines must not be negative".to_string());
        }
        if server.cors_allow_origins.is_empty() {
            errors.push("server.cors_allow_origins must list at least one origin".to_string());
        }
        if let Some(context) = &self.cluster.context
            && context.trim().is_empty()
        {
            errors.push("cluster.context must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
