mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use kubeview_k8s::{CredentialSource, KubeClient};
use kubeview_server::HttpServer;

use crate::config::Settings;

/// kubeview - HTTP and WebSocket gateway for Kubernetes namespaces, pods and logs
#[derive(Parser, Debug)]
#[command(name = "kubeview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Where to load cluster credentials from (auto, in-cluster, kubeconfig)
    #[arg(long)]
    source: Option<CredentialSource>,

    /// Kubeconfig file to use instead of KUBECONFIG / ~/.kube/config
    #[arg(long, value_name = "FILE")]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    context: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command line flags win over the settings file
    fn apply(&self, settings: &mut Settings) {
        if let Some(bind) = &self.bind {
            settings.server.bind_address = bind.clone();
        }
        if let Some(source) = self.source {
            settings.cluster.source = source;
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            settings.cluster.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(context) = &self.context {
            settings.cluster.context = Some(context.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "kubeview=debug,tower_http=debug"
    } else {
        "kubeview=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);
    settings.validate()?;

    tracing::info!(
        bind_address = %settings.server.bind_address,
        source = %settings.cluster.source,
        request_timeout_secs = settings.server.request_timeout_secs,
        "Configuration loaded"
    );

    let client = kubeview_k8s::connect(&settings.cluster).await?;

    let listener = TcpListener::bind(&settings.server.bind_address)
        .await
        .context(format!("Failed to bind {}", settings.server.bind_address))?;

    let server = HttpServer::new(settings.server, KubeClient::new(client));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
