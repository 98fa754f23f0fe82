// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Health check providers. The reconciler only talks to the `HealthCheckProvider` trait.

pub mod route53;

use crate::error::ProviderError;
use crate::types::{CreateRequest, HealthCheckRecord, HealthCheckSpec};
use async_trait::async_trait;

pub use route53::Route53Provider;

#[async_trait]
pub trait HealthCheckProvider: Send + Sync {
    /// Create a health check. Repeating a request with the same caller reference
    /// must return the existing check instead of a new one.
    async fn create(&self, request: &CreateRequest) -> Result<HealthCheckRecord, ProviderError>;

    /// Look up a health check; `Ok(None)` when it does not exist.
    async fn get(&self, id: &str) -> Result<Option<HealthCheckRecord>, ProviderError>;

    /// Find the health check created with `caller_reference`, if any.
    async fn find_by_caller_reference(
        &self,
        caller_reference: &str,
    ) -> Result<Option<HealthCheckRecord>, ProviderError>;

    /// Change endpoint, port and path of an existing check. The protocol cannot change.
    async fn update(&self, id: &str, spec: &HealthCheckSpec) -> Result<(), ProviderError>;

    /// Delete a health check; `Ok(false)` when it was already gone.
    async fn delete(&self, id: &str) -> Result<bool, ProviderError>;
}
