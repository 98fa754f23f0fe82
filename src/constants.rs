// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by the operator
pub mod annotations {
    /// When set to "true", a Route 53 health check is kept for this ingress
    pub const ENABLE: &str = "r53.kubernetes.io/enable";
    /// Health check protocol override: HTTP, HTTPS or TCP (optional)
    pub const TYPE: &str = "r53.kubernetes.io/type";
    /// Endpoint host override (optional)
    pub const FQDN: &str = "r53.kubernetes.io/fqdn";
    /// Endpoint port override (optional)
    pub const PORT: &str = "r53.kubernetes.io/port";
    /// Request path for HTTP(S) checks (optional)
    pub const PATH: &str = "r53.kubernetes.io/path";
    /// Written by the operator: Route 53 id of the owned health check
    pub const HEALTH_CHECK_ID: &str = "r53.kubernetes.io/health-check-id";
    /// Written by the operator: idempotency token used for CreateHealthCheck
    pub const CALLER_REFERENCE: &str = "r53.kubernetes.io/caller-reference";
}

/// Finalizer guarding ingresses that own a health check
pub const FINALIZER: &str = "r53.kubernetes.io/health-check";

/// The operator name used as field manager for patches
pub const OPERATOR_NAME: &str = "ingress-r53";

/// Tag keys set on created health checks
pub mod tags {
    pub const NAME: &str = "Name";
    pub const INGRESS_UID: &str = "kubernetes.io/ingress-uid";
}

/// Route 53 limits CallerReference to 64 characters
pub const CALLER_REFERENCE_MAX_LEN: usize = 64;

/// Controller defaults, overridable through the environment
pub mod controller {
    pub const CONCURRENT_WORKERS: u16 = 1;
    pub const RESYNC_INTERVAL_SECS: u64 = 45;
    pub const PROCESSING_JOB_RETRIES: u32 = 5;
}

/// Retry backoff for failed reconciliations
pub mod backoff {
    /// First retry delay in seconds
    pub const INITIAL_INTERVAL_SECS: u64 = 1;
    /// Maximum retry delay in seconds (exponential backoff cap)
    pub const MAX_INTERVAL_SECS: u64 = 300;
}
