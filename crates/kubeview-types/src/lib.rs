//! Shared types for kubeview
//!
//! This crate contains the query and response shapes used by the HTTP
//! surface and the Kubernetes client.

use serde::{Deserialize, Serialize};

/// Number of log lines returned by `/api/logs` when `tail` is omitted
pub const DEFAULT_TAIL_LINES: i64 = 100;

// ============================================================================
// Response Envelopes
// ============================================================================

/// `{"namespaces": [...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceList {
    pub namespaces: Vec<String>,
}

/// `{"pods": [...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodList {
    pub pods: Vec<String>,
}

/// `{"containers": [...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerList {
    pub containers: Vec<String>,
}

/// `{"logs": "..."}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodLogs {
    pub logs: String,
}

/// Body returned with every error response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
pub struct PodsQuery {
    pub namespace: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContainersQuery {
    pub namespace: String,
    pub pod: String,
}

/// Query for the log snapshot endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct LogsQuery {
    pub namespace: String,
    pub pod: String,
    pub container: String,

    /// Lines from the end of the log; the server default applies when absent
    pub tail: Option<i64>,

    pub since_seconds: Option<i64>,

    #[serde(default)]
    pub timestamps: bool,

    /// Read the logs of the previous container instance
    #[serde(default)]
    pub previous: bool,
}

/// Query for the streaming endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct StreamQuery {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub tail: Option<i64>,

    #[serde(default)]
    pub timestamps: bool,
}

// ============================================================================
// Log Options
// ============================================================================

/// Options forwarded to the control plane's log endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub tail_lines: Option<i64>,
    pub since_seconds: Option<i64>,
    pub timestamps: bool,
    pub previous: bool,
}

impl LogOptions {
    /// Options for a snapshot read, falling back to `default_tail` lines
    pub fn snapshot(query: &LogsQuery, default_tail: i64) -> Self {
        Self {
            tail_lines: Some(query.tail.unwrap_or(default_tail)),
            since_seconds: query.since_seconds,
            timestamps: query.timestamps,
            previous: query.previous,
        }
    }

    /// Options for a follow stream; without `tail` the whole log is replayed
    pub fn follow(query: &StreamQuery) -> Self {
        Self {
            tail_lines: query.tail,
            timestamps: query.timestamps,
            ..Default::default()
        }
    }

    /// Reject values the control plane would refuse
    pub fn validate(&self) -> Result<(), String> {
        if let Some(tail) = self.tail_lines
            && tail < 0
        {
            return Err(format!("tail must not be negative, got {}", tail));
        }
        if let Some(since) = self.since_seconds
            && since <= 0
        {
            return Err(format!("since_seconds must be positive, got {}", since));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs_query(tail: Option<i64>) -> LogsQuery {
        LogsQuery {
            namespace: "default".to_string(),
            pod: "web".to_string(),
            container: "app".to_string(),
            tail,
            since_seconds: None,
            timestamps: false,
            previous: false,
        }
    }

    #[test]
    fn test_snapshot_uses_default_tail() {
        let opts = LogOptions::snapshot(&logs_query(None), DEFAULT_TAIL_LINES);
        assert_eq!(opts.tail_lines, Some(100));

        let opts = LogOptions::snapshot(&logs_query(Some(5)), DEFAULT_TAIL_LINES);
        assert_eq!(opts.tail_lines, Some(5));
    }

    #[test]
    fn test_validate_rejects_negative_tail() {
        let opts = LogOptions::snapshot(&logs_query(Some(-1)), DEFAULT_TAIL_LINES);
        assert!(opts.validate().is_err());

        let opts = LogOptions::snapshot(&logs_query(Some(0)), DEFAULT_TAIL_LINES);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_since() {
        let mut opts = LogOptions::default();
        opts.since_seconds = Some(0);
        assert!(opts.validate().is_err());

        opts.since_seconds = Some(60);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_follow_keeps_tail_optional() {
        let query = StreamQuery {
            namespace: "default".to_string(),
            pod: "web".to_string(),
            container: "app".to_string(),
            tail: None,
            timestamps: true,
        };
        let opts = LogOptions::follow(&query);
        assert_eq!(opts.tail_lines, None);
        assert!(opts.timestamps);
    }

    #[test]
    fn test_envelope_shapes() {
        let body = serde_json::to_string(&PodList {
            pods: vec!["a".to_string(), "b".to_string()],
        })
        .unwrap();
        assert_eq!(body, r#"{"pods":["a","b"]}"#);

        let body = serde_json::to_string(&ErrorBody::new("boom")).unwrap();
        assert_eq!(body, r#"{"error":"boom"}"#);
    }
}
