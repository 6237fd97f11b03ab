//! Server settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use kubeview_types::DEFAULT_TAIL_LINES;

/// HTTP surface configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,

    /// Timeout for REST requests in seconds. The streaming route is exempt.
    pub request_timeout_secs: u64,

    /// Origins allowed by CORS; `"*"` allows any origin.
    pub cors_allow_origins: Vec<String>,

    /// Log lines returned by `/api/logs` when the client does not ask for a count.
    pub default_tail_lines: i64,

    /// Pause after each relayed line on the streaming route, in milliseconds.
    pub stream_interval_ms: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow_origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            cors_allow_origins: vec!["*".to_string()],
            default_tail_lines: DEFAULT_TAIL_LINES,
            stream_interval_ms: 100,
        }
    }
}
