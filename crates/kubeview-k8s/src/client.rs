//! Kubernetes client for kubeview

use anyhow::{Context, Result};
use futures::stream::BoxStream;
use futures::{AsyncBufReadExt, StreamExt};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::Api;
use kube::api::{ListParams, LogParams};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use crate::types::LogOptions;

/// Stream of raw log lines from a followed container
pub type LogLines = BoxStream<'static, std::io::Result<String>>;

/// Lines buffered between the upstream reader and the consumer
const LINE_BUFFER: usize = 64;

/// Kubernetes client wrapper
///
/// Every method performs exactly one read-only call against the control plane.
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Fetch all namespace names from the cluster
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;

        Ok(list
            .items
            .into_iter()
            .map(|ns| ns.metadata.name.unwrap_or_default())
            .collect())
    }

    /// Fetch all pod names in a namespace
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<String>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods
            .list(&ListParams::default())
            .await
            .context(format!("Failed to list pods in '{}'", namespace))?;

        Ok(list
            .items
            .into_iter()
            .map(|pod| pod.metadata.name.unwrap_or_default())
            .collect())
    }

    /// Fetch the container names declared in a pod's spec
    pub async fn list_containers(&self, namespace: &str, pod: &str) -> Result<Vec<String>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods.get(pod).await.context(format!(
            "Failed to get pod '{}' in namespace '{}'",
            pod, namespace
        ))?;

        Ok(pod
            .spec
            .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
            .unwrap_or_default())
    }

    /// Fetch a snapshot of a container's logs
    pub async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        options: &LogOptions,
    ) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = log_params(container, options, false);

        pods.logs(pod, &params).await.context(format!(
            "Failed to read logs of {}/{} in namespace '{}'",
            pod, container, namespace
        ))
    }

    /// Open a follow stream of a container's logs, split into lines
    ///
    /// The upstream stream is read by a spawned task that forwards each line
    /// into a bounded channel. The task stops when the upstream ends, fails, or
    /// the returned stream is dropped.
    pub async fn log_stream(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        options: &LogOptions,
    ) -> Result<LogLines> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = log_params(container, options, true);
        let pod_name = pod.to_string();

        let (tx, rx) = mpsc::channel::<std::io::Result<String>>(LINE_BUFFER);
        let (opened_tx, opened_rx) = oneshot::channel::<kube::Result<()>>();

        tokio::spawn(async move {
            let stream = match pods.log_stream(&pod_name, &params).await {
                Ok(stream) => {
                    let _ = opened_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = opened_tx.send(Err(e));
                    return;
                }
            };

            let mut lines = stream.lines();
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    next = lines.next() => match next {
                        Some(line) => {
                            let failed = line.is_err();
                            if tx.send(line).await.is_err() || failed {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        let opened = opened_rx
            .await
            .context("Log stream task exited before opening")?;
        opened.context(format!(
            "Failed to follow logs of {}/{} in namespace '{}'",
            pod, container, namespace
        ))?;

        tracing::debug!(namespace, pod, container, "Opened log stream");
        Ok(ReceiverStream::new(rx).boxed())
    }
}

/// Translate gateway log options into the control plane's parameters
pub(crate) fn log_params(container: &str, options: &LogOptions, follow: bool) -> LogParams {
    LogParams {
        follow,
        container: Some(container.to_string()),
        tail_lines: options.tail_lines,
        since_seconds: options.since_seconds,
        timestamps: options.timestamps,
        previous: options.previous,
        ..Default::default()
    }
}
