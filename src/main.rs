// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ingress_r53::config::Config;
use ingress_r53::kubernetes::create_client;
use ingress_r53::provider::Route53Provider;
use ingress_r53::reconcilers::IngressReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run().await.inspect_err(|e| error!("{:#}", e))
}

async fn run() -> Result<()> {
    info!("Starting ingress-r53 operator");

    let config = Config::from_env().context("error loading configuration")?;
    info!("Configuration loaded: {:?}", config);

    let client = create_client()
        .await
        .context("error creating kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let provider = Route53Provider::from_env().await;

    let reconciler = IngressReconciler::new(client, Arc::new(provider), config);
    reconciler.run().await.context("error running controller")?;

    info!("Shutdown complete");
    Ok(())
}
