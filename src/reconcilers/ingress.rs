// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ingress reconciler - keeps one Route 53 health check per enabled Ingress.

use crate::backoff::RetryTracker;
use crate::config::Config;
use crate::error::{OperatorError, Result};
use crate::kubernetes::ingress::{claim, record_health_check, release};
use crate::provider::HealthCheckProvider;
use crate::types::{
    plan, CreateRequest, HealthCheckRecord, HealthCheckSpec, IngressExt, Plan, ResourceKey,
};
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    runtime::{
        controller::{Action, Config as ControllerConfig},
        watcher, Controller,
    },
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct IngressReconciler {
    client: Client,
    provider: Arc<dyn HealthCheckProvider>,
    config: Config,
    retries: RetryTracker,
}

impl IngressReconciler {
    pub fn new(client: Client, provider: Arc<dyn HealthCheckProvider>, config: Config) -> Self {
        let retries = RetryTracker::new(config.processing_job_retries);
        Self {
            client,
            provider,
            config,
            retries,
        }
    }

    /// Watch ingresses until a stop signal arrives
    pub async fn run(self) -> anyhow::Result<()> {
        let ingresses: Api<Ingress> = match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let controller_config = ControllerConfig::default().concurrency(self.config.concurrent_workers);

        info!(
            "Watching ingresses in {} (workers={}, resync={:?}, retries={})",
            self.config.watch_namespace.as_deref().unwrap_or("all namespaces"),
            self.config.concurrent_workers,
            self.config.resync_interval,
            self.config.processing_job_retries
        );

        let context = Arc::new(self);

        Controller::new(ingresses, watcher::Config::default())
            .with_config(controller_config)
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled ingress: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("Ingress controller stopped");
        Ok(())
    }

    /// Find the health check this ingress owns: by recorded id, else by caller reference.
    ///
    /// The reference lookup covers a create that went through while recording its
    /// id did not, including after a fresh reference replaced an older check.
    async fn resolve(
        &self,
        key: &ResourceKey,
        health_check_id: Option<&str>,
        caller_reference: Option<&str>,
    ) -> Result<Option<HealthCheckRecord>> {
        if let Some(id) = health_check_id {
            if let Some(record) = self.provider.get(id).await? {
                return Ok(Some(record));
            }
        }

        let Some(reference) = caller_reference else {
            return Ok(None);
        };
        let found = self.provider.find_by_caller_reference(reference).await?;
        if let Some(record) = &found {
            debug!("Found health check {} for {} by caller reference {}", record.id, key, reference);
        }
        Ok(found)
    }

    async fn ensure(
        &self,
        api: &Api<Ingress>,
        ingress: &Ingress,
        spec: HealthCheckSpec,
        health_check_id: Option<String>,
        caller_reference: Option<String>,
    ) -> Result<()> {
        let key = ingress.key();

        let existing = self
            .resolve(&key, health_check_id.as_deref(), caller_reference.as_deref())
            .await?;

        match existing {
            Some(record) => match &record.spec {
                Some(current) if current.kind == spec.kind => {
                    let recorded = health_check_id.as_deref() == Some(record.id.as_str());
                    if !recorded || !ingress.has_finalizer() {
                        let reference = caller_reference
                            .clone()
                            .unwrap_or_else(|| ingress.new_caller_reference());
                        claim(api, ingress, &reference, Some(&record.id)).await?;
                    }

                    if *current == spec {
                        debug!("Health check {} for {} is up to date", record.id, key);
                    } else {
                        self.provider.update(&record.id, &spec).await?;
                        info!("healthcheck updated: {} ({})", key, record.id);
                    }
                    return Ok(());
                }
                _ => {
                    info!(
                        "Health check {} for {} needs a different protocol, replacing it",
                        record.id, key
                    );
                    self.provider.delete(&record.id).await?;
                }
            },
            None => {
                if let Some(id) = &health_check_id {
                    warn!("Health check {} for {} no longer exists, recreating it", id, key);
                }
            }
        }

        // Nothing lives under the stored reference, and Route 53 refuses one whose check
        // was deleted, so every create goes out under a freshly claimed reference
        let caller_reference = ingress.new_caller_reference();
        claim(api, ingress, &caller_reference, None).await?;

        let record = self
            .provider
            .create(&CreateRequest {
                owner: key.clone(),
                owner_uid: ingress.uid().unwrap_or_default(),
                caller_reference,
                spec,
            })
            .await?;

        record_health_check(api, ingress, &record.id).await?;

        info!(
            "healthcheck added: {:?}/{} ({})",
            ingress.annotations(),
            ingress.name_any(),
            record.id
        );
        Ok(())
    }

    async fn delete(&self, key: &ResourceKey, id: &str) -> Result<()> {
        if self.provider.delete(id).await? {
            info!("healthcheck deleted: {} ({})", key, id);
        } else {
            info!("healthcheck {} for {} was already gone", id, key);
        }
        Ok(())
    }

    async fn retract(
        &self,
        api: &Api<Ingress>,
        ingress: &Ingress,
        health_check_id: Option<String>,
        caller_reference: Option<String>,
    ) -> Result<()> {
        let key = ingress.key();

        if let Some(id) = &health_check_id {
            self.delete(&key, id).await?;
        }

        // A check created under the reference may not have had its id recorded
        if let Some(reference) = caller_reference {
            if let Some(record) = self.provider.find_by_caller_reference(&reference).await? {
                if health_check_id.as_deref() != Some(record.id.as_str()) {
                    self.delete(&key, &record.id).await?;
                }
            }
        }

        release(api, ingress).await
    }
}

#[instrument(skip(ingress, ctx), fields(ingress = %ingress.key()))]
pub async fn reconcile(ingress: Arc<Ingress>, ctx: Arc<IngressReconciler>) -> Result<Action> {
    let key = ingress.key();
    let api: Api<Ingress> = Api::namespaced(ctx.client.clone(), &key.namespace);

    debug!("Reconciling ingress: {}", key);

    let action = match plan(&ingress)? {
        Plan::Skip => {
            debug!("Ingress {} is not enabled, skipping", key);
            Action::await_change()
        }
        Plan::Ensure {
            spec,
            health_check_id,
            caller_reference,
        } => {
            ctx.ensure(&api, &ingress, spec, health_check_id, caller_reference)
                .await?;
            Action::requeue(ctx.config.resync_interval)
        }
        Plan::Retract {
            health_check_id,
            caller_reference,
        } => {
            info!("Ingress {} is no longer enabled, retracting its health check", key);
            ctx.retract(&api, &ingress, health_check_id, caller_reference)
                .await?;
            Action::await_change()
        }
        Plan::Finalize {
            health_check_id,
            caller_reference,
        } => {
            info!("Ingress {} is being deleted, retracting its health check", key);
            ctx.retract(&api, &ingress, health_check_id, caller_reference)
                .await?;
            Action::await_change()
        }
    };

    ctx.retries.reset(&key);
    Ok(action)
}

pub fn error_policy(
    ingress: Arc<Ingress>,
    error: &OperatorError,
    ctx: Arc<IngressReconciler>,
) -> Action {
    let key = ingress.key();

    if !error.is_retryable() {
        error!("Reconciliation of {} failed: {}", key, error);
        ctx.retries.reset(&key);
        return Action::requeue(ctx.config.resync_interval);
    }

    match ctx.retries.next_retry(&key) {
        Some(delay) => {
            warn!("Reconciliation of {} failed, retrying in {:?}: {}", key, delay, error);
            Action::requeue(delay)
        }
        None => {
            error!(
                "Reconciliation of {} failed {} times, waiting for resync: {}",
                key, ctx.config.processing_job_retries, error
            );
            Action::requeue(ctx.config.resync_interval)
        }
    }
}
