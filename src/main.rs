use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kube_nslist::{Connection, NamespacedResources, schema};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "kube-nslist",
    version,
    about = "List names of namespaced Kubernetes resources by group/version/resource"
)]
struct Cli {
    /// API group of the resource; use "" or "core" for the core API.
    group: String,
    /// API version of the resource.
    version: String,
    /// Plural resource name, e.g. `pods`.
    resource_name: String,

    /// Namespace to list in. Defaults to the context's namespace, then "default".
    #[arg(short, long)]
    namespace: Option<String>,

    /// Override the Kubernetes context to target.
    #[arg(long)]
    context: Option<String>,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let connection = Connection::from_kubeconfig(cli.context.as_deref()).await?;
    tracing::debug!(context = ?connection.context(), "loaded kubeconfig");

    let namespace = connection.determine_namespace(cli.namespace);
    let config: serde_json::Map<_, _> = [
        (schema::NAMESPACE, namespace),
        (schema::GROUP, cli.group),
        (schema::VERSION, cli.version),
        (schema::RESOURCE_NAME, cli.resource_name),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
    .collect();
    let config = serde_json::Value::Object(config);

    let mut state = NamespacedResources::new();
    let read = state.read(&config, &connection);
    match cli.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), read)
            .await
            .context("timed out listing resources")??,
        None => read.await?,
    }

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
