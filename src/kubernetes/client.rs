// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation

use crate::error::{OperatorError, Result};
use kube::{config::KubeConfigOptions, Client, Config as KConfig};
use tracing::{debug, info};

/// Create a Kubernetes client, preferring the in-cluster service account and
/// falling back to the local kubeconfig (`$KUBECONFIG` or `~/.kube/config`).
pub async fn create_client() -> Result<Client> {
    let config = match KConfig::incluster() {
        Ok(config) => {
            info!("Using in-cluster Kubernetes configuration");
            config
        }
        Err(e) => {
            debug!("In-cluster configuration unavailable: {}", e);
            info!("Not running in a cluster, loading local kubeconfig");
            KConfig::from_kubeconfig(&KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    OperatorError::KubeconfigError(format!("Failed to load kubeconfig: {}", e))
                })?
        }
    };

    Client::try_from(config)
        .map_err(|e| OperatorError::KubeconfigError(format!("Failed to create client: {}", e)))
}
