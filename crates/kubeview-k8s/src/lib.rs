//! Kubernetes client for kubeview
//!
//! This crate resolves control-plane credentials and provides the read-only
//! calls behind the gateway: namespaces, pods, containers and pod logs.

mod client;
mod credentials;

pub use client::{KubeClient, LogLines};
pub use credentials::{ClusterOptions, CredentialSource, ResolvedConfig, connect, resolve_config};

// Re-export types that are used in our public API
pub use kubeview_types as types;
pub use kubeview_types::LogOptions;
