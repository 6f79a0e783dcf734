// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use http::Method;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::List;
use tracing::info;

use kubesession::config::Config;
use kubesession::session::{build_session, read_body};

/// Send one request to the cluster of the current kubeconfig context
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Request URL, `kube://` and `$$NAMESPACE$$` are substituted
    #[arg(default_value = "kube:///api/v1/namespaces/$$NAMESPACE$$/pods")]
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: Method,

    /// Decode the response as a pod list and print the pod names
    #[arg(long)]
    pods: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let kubeconfig = config.load_kubeconfig()?;
    let session = build_session(&kubeconfig, &config.session_options())
        .context("Failed to build session")?;
    info!(
        "Session ready for {} in namespace {}",
        session.server(),
        session.namespace()
    );

    if cli.pods {
        let pods: List<Pod> = session
            .get_json(&cli.url)
            .await
            .with_context(|| format!("Failed to list pods from {}", cli.url))?;
        for pod in pods.items {
            println!("{}", pod.metadata.name.unwrap_or_default());
        }
        return Ok(());
    }

    let response = session
        .request(cli.method, cli.url.as_str())
        .send()
        .await
        .with_context(|| format!("Request to {} failed", cli.url))?;
    let status = response.status();
    let body = read_body(response).await?;

    info!("Response status {}", status);
    println!("{}", String::from_utf8_lossy(&body));
    Ok(())
}
