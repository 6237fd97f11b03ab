//! Control-plane credential resolution
//!
//! The gateway prefers the in-cluster service account and falls back to a
//! local kubeconfig, which is the reverse of `kube::Config::infer`.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use serde::{Deserialize, Serialize};

/// Where credentials may be loaded from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialSource {
    /// In-cluster first, then kubeconfig
    #[default]
    Auto,
    InCluster,
    Kubeconfig,
}

impl CredentialSource {
    /// Sources to try, in order
    pub fn attempts(&self) -> &'static [CredentialSource] {
        match self {
            Self::Auto => &[Self::InCluster, Self::Kubeconfig],
            Self::InCluster => &[Self::InCluster],
            Self::Kubeconfig => &[Self::Kubeconfig],
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::InCluster => "in-cluster",
            Self::Kubeconfig => "kubeconfig",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for CredentialSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "in-cluster" | "incluster" => Ok(Self::InCluster),
            "kubeconfig" => Ok(Self::Kubeconfig),
            other => Err(format!(
                "unknown credential source '{}' (expected auto, in-cluster or kubeconfig)",
                other
            )),
        }
    }
}

/// Cluster connection settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    pub source: CredentialSource,

    /// Explicit kubeconfig path; `KUBECONFIG` or `~/.kube/config` otherwise
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context; the current context otherwise
    pub context: Option<String>,
}

/// A loaded config together with the source that produced it
pub struct ResolvedConfig {
    pub config: kube::Config,
    pub source: CredentialSource,
}

/// Resolve a `kube::Config` according to `options`
pub async fn resolve_config(options: &ClusterOptions) -> Result<ResolvedConfig> {
    let mut failures = Vec::new();

    for &source in options.source.attempts() {
        let attempt = match source {
            CredentialSource::InCluster => load_in_cluster(),
            _ => load_kubeconfig(options).await,
        };

        match attempt {
            Ok(config) => {
                tracing::info!(
                    source = %source,
                    cluster_url = %config.cluster_url,
                    "Resolved cluster credentials"
                );
                return Ok(ResolvedConfig { config, source });
            }
            Err(e) => {
                tracing::debug!(
                    source = %source,
                    error = %format!("{:#}", e),
                    "Credential source unavailable"
                );
                failures.push(format!("{}: {:#}", source, e));
            }
        }
    }

    anyhow::bail!("No usable cluster credentials ({})", failures.join("; "))
}

/// Resolve credentials and build a client
pub async fn connect(options: &ClusterOptions) -> Result<kube::Client> {
    let resolved = resolve_config(options).await?;
    kube::Client::try_from(resolved.config).context("Failed to create Kubernetes client")
}

fn load_in_cluster() -> Result<kube::Config> {
    kube::Config::incluster().context("In-cluster service account not available")
}

async fn load_kubeconfig(options: &ClusterOptions) -> Result<kube::Config> {
    let kube_options = KubeConfigOptions {
        context: options.context.clone(),
        ..Default::default()
    };

    match &options.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .context(format!("Failed to read kubeconfig at {}", path.display()))?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &kube_options)
                .await
                .context("Failed to load kubeconfig")
        }
        None => kube::Config::from_kubeconfig(&kube_options)
            .await
            .context("Failed to read kubeconfig. Is kubectl configured?"),
    }
}
