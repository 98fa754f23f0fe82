// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Health check provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("No endpoint to check: {0}")]
    MissingEndpoint(String),
}

impl OperatorError {
    /// Whether retrying the same reconciliation soon can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            OperatorError::KubeError(kube::Error::Api(resp)) => {
                matches!(resp.code, 409 | 429) || resp.code >= 500
            }
            OperatorError::KubeError(_) => true,
            OperatorError::ProviderError(e) => e.is_retryable(),
            OperatorError::KubeconfigError(_)
            | OperatorError::InvalidAnnotation(_)
            | OperatorError::MissingEndpoint(_) => false,
        }
    }
}

/// Failures reported by a health check provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Throttling, timeouts, dispatch failures and server-side errors
    #[error("transient failure: {0}")]
    Transient(String),

    /// The provider refused the request as given
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("health check {0} not found")]
    NotFound(String),
}

impl ProviderError {
    /// A vanished check is retried too: the next attempt recreates it
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transient(_) | ProviderError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
