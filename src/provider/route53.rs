// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Route 53 backed health check provider

use crate::constants::tags;
use crate::error::ProviderError;
use crate::provider::HealthCheckProvider;
use crate::types::{CreateRequest, HealthCheckKind, HealthCheckRecord, HealthCheckSpec};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{HealthCheck, HealthCheckConfig, HealthCheckType, Tag, TagResourceType};
use aws_sdk_route53::Client;
use tracing::{debug, info, instrument};

/// Error codes Route 53 returns for conditions that clear up on their own
const RETRYABLE_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "PriorRequestNotComplete",
    "RequestTimeout",
    "ServiceUnavailable",
    "InternalError",
    "InternalFailure",
];

#[derive(Clone, Debug)]
pub struct Route53Provider {
    client: Client,
}

impl Route53Provider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a provider with credentials and region from the default AWS chain
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        info!(
            "Route 53 client configured (region: {})",
            sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "default".to_string())
        );
        Self::new(Client::new(&sdk_config))
    }

    async fn tag(&self, id: &str, request: &CreateRequest) -> Result<(), ProviderError> {
        self.client
            .change_tags_for_resource()
            .resource_type(TagResourceType::Healthcheck)
            .resource_id(id)
            .add_tags(Tag::builder().key(tags::NAME).value(request.owner.to_string()).build())
            .add_tags(
                Tag::builder()
                    .key(tags::INGRESS_UID)
                    .value(&request.owner_uid)
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheckProvider for Route53Provider {
    #[instrument(skip(self, request), fields(ingress = %request.owner))]
    async fn create(&self, request: &CreateRequest) -> Result<HealthCheckRecord, ProviderError> {
        let output = self
            .client
            .create_health_check()
            .caller_reference(&request.caller_reference)
            .health_check_config(health_check_config(&request.spec)?)
            .send()
            .await
            .map_err(classify)?;

        let record = output.health_check().map(to_record).ok_or_else(|| {
            ProviderError::Transient("CreateHealthCheck returned no health check".to_string())
        })?;
        debug!("Route 53 health check {} created", record.id);

        // Tagging is idempotent; a failure here retries the whole create with the same caller reference
        self.tag(&record.id, request).await?;

        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<HealthCheckRecord>, ProviderError> {
        match self.client.get_health_check().health_check_id(id).send().await {
            Ok(output) => Ok(output.health_check().map(to_record)),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_health_check()) => {
                Ok(None)
            }
            Err(err) => Err(classify(err)),
        }
    }

    async fn find_by_caller_reference(
        &self,
        caller_reference: &str,
    ) -> Result<Option<HealthCheckRecord>, ProviderError> {
        let mut health_checks = self.client.list_health_checks().into_paginator().items().send();

        while let Some(health_check) = health_checks.next().await {
            let health_check = health_check.map_err(classify)?;
            if health_check.caller_reference() == caller_reference {
                return Ok(Some(to_record(&health_check)));
            }
        }

        Ok(None)
    }

    #[instrument(skip(self, spec))]
    async fn update(&self, id: &str, spec: &HealthCheckSpec) -> Result<(), ProviderError> {
        let result = self
            .client
            .update_health_check()
            .health_check_id(id)
            .fully_qualified_domain_name(&spec.fqdn)
            .port(i32::from(spec.port))
            .set_resource_path(spec.resource_path.clone())
            .enable_sni(spec.kind == HealthCheckKind::Https)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_health_check()) => {
                Err(ProviderError::NotFound(id.to_string()))
            }
            Err(err) => Err(classify(err)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, ProviderError> {
        match self.client.delete_health_check().health_check_id(id).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_health_check()) => {
                debug!("Route 53 health check {} already gone", id);
                Ok(false)
            }
            Err(err) => Err(classify(err)),
        }
    }
}

fn health_check_type(kind: HealthCheckKind) -> HealthCheckType {
    match kind {
        HealthCheckKind::Http => HealthCheckType::Http,
        HealthCheckKind::Https => HealthCheckType::Https,
        HealthCheckKind::Tcp => HealthCheckType::Tcp,
    }
}

fn health_check_config(spec: &HealthCheckSpec) -> Result<HealthCheckConfig, ProviderError> {
    HealthCheckConfig::builder()
        .r#type(health_check_type(spec.kind))
        .fully_qualified_domain_name(&spec.fqdn)
        .port(i32::from(spec.port))
        .set_resource_path(spec.resource_path.clone())
        .enable_sni(spec.kind == HealthCheckKind::Https)
        .build()
        .map_err(|e| ProviderError::Rejected(format!("invalid health check config: {}", e)))
}

fn to_record(health_check: &HealthCheck) -> HealthCheckRecord {
    HealthCheckRecord {
        id: health_check.id().to_string(),
        spec: health_check.health_check_config().and_then(to_spec),
    }
}

fn to_spec(config: &HealthCheckConfig) -> Option<HealthCheckSpec> {
    let kind = match config.r#type() {
        HealthCheckType::Http => HealthCheckKind::Http,
        HealthCheckType::Https => HealthCheckKind::Https,
        HealthCheckType::Tcp => HealthCheckKind::Tcp,
        _ => return None,
    };
    let resource_path = match kind {
        HealthCheckKind::Tcp => None,
        HealthCheckKind::Http | HealthCheckKind::Https => {
            Some(config.resource_path().unwrap_or("/").to_string())
        }
    };

    Some(HealthCheckSpec {
        kind,
        fqdn: config.fully_qualified_domain_name()?.to_string(),
        port: config.port().and_then(|p| u16::try_from(p).ok())?,
        resource_path,
    })
}

/// Split SDK failures into retryable and permanent ones
fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ProviderError::Transient(message)
        }
        _ if err.code().is_some_and(|code| RETRYABLE_CODES.contains(&code)) => {
            ProviderError::Transient(message)
        }
        _ => ProviderError::Rejected(message),
    }
}
