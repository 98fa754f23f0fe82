// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::str::FromStr;

/// Namespace and name of a watched ingress
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Protocol used by a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthCheckKind {
    Http,
    Https,
    Tcp,
}

impl HealthCheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCheckKind::Http => "HTTP",
            HealthCheckKind::Https => "HTTPS",
            HealthCheckKind::Tcp => "TCP",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            HealthCheckKind::Https => 443,
            HealthCheckKind::Http | HealthCheckKind::Tcp => 80,
        }
    }
}

impl fmt::Display for HealthCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthCheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HTTP" => Ok(HealthCheckKind::Http),
            "HTTPS" => Ok(HealthCheckKind::Https),
            "TCP" => Ok(HealthCheckKind::Tcp),
            other => Err(format!("unsupported health check type {:?}", other)),
        }
    }
}

/// Desired configuration of a health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckSpec {
    pub kind: HealthCheckKind,
    pub fqdn: String,
    pub port: u16,
    /// Always `None` for TCP checks
    pub resource_path: Option<String>,
}

/// A health check as known to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckRecord {
    pub id: String,
    /// `None` when the provider-side check cannot be described by a `HealthCheckSpec`
    pub spec: Option<HealthCheckSpec>,
}

/// Everything a provider needs to create a health check for an ingress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub owner: ResourceKey,
    pub owner_uid: String,
    pub caller_reference: String,
    pub spec: HealthCheckSpec,
}
