// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ingress accessors and the event-to-action planner.

use crate::constants::{annotations, CALLER_REFERENCE_MAX_LEN, FINALIZER};
use crate::error::{OperatorError, Result};
use crate::types::health_check::{HealthCheckKind, HealthCheckSpec, ResourceKey};
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;

/// What a reconciliation has to do for one ingress snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Not ours: no annotation, no recorded health check, no finalizer
    Skip,
    /// Make sure exactly one health check matching `spec` exists
    Ensure {
        spec: HealthCheckSpec,
        health_check_id: Option<String>,
        caller_reference: Option<String>,
    },
    /// Annotation cleared while a health check may still exist
    Retract {
        health_check_id: Option<String>,
        caller_reference: Option<String>,
    },
    /// Ingress is being deleted and still carries our finalizer
    Finalize {
        health_check_id: Option<String>,
        caller_reference: Option<String>,
    },
}

/// Operator-specific views of an `Ingress`
pub trait IngressExt {
    fn key(&self) -> ResourceKey;
    fn is_enabled(&self) -> bool;
    fn is_deleting(&self) -> bool;
    fn has_finalizer(&self) -> bool;
    fn health_check_id(&self) -> Option<String>;
    fn caller_reference(&self) -> Option<String>;
    fn new_caller_reference(&self) -> String;
    fn desired_health_check(&self) -> Result<HealthCheckSpec>;
}

impl IngressExt for Ingress {
    fn key(&self) -> ResourceKey {
        ResourceKey::new(self.namespace().unwrap_or_default(), self.name_any())
    }

    /// Check if the ingress has the enable annotation set to "true"
    fn is_enabled(&self) -> bool {
        self.annotations()
            .get(annotations::ENABLE)
            .is_some_and(|v| v == "true")
    }

    fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    fn has_finalizer(&self) -> bool {
        self.finalizers().iter().any(|f| f == FINALIZER)
    }

    fn health_check_id(&self) -> Option<String> {
        non_empty_annotation(self, annotations::HEALTH_CHECK_ID)
    }

    fn caller_reference(&self) -> Option<String> {
        non_empty_annotation(self, annotations::CALLER_REFERENCE)
    }

    /// Build a fresh idempotency token from the uid and the current resource version.
    ///
    /// The token is stored on the ingress before the first create call, so retries
    /// after a lost response reuse it and Route 53 hands back the same check.
    fn new_caller_reference(&self) -> String {
        let uid = self.uid().unwrap_or_else(|| self.key().to_string());
        let reference = match self.resource_version() {
            Some(rv) => format!("{}-{}", uid, rv),
            None => uid,
        };
        reference.chars().take(CALLER_REFERENCE_MAX_LEN).collect()
    }

    /// Derive the health check configuration from annotations, rules and status
    fn desired_health_check(&self) -> Result<HealthCheckSpec> {
        let key = self.key();
        let values = self.annotations();

        let kind = match values.get(annotations::TYPE) {
            Some(raw) => raw.parse::<HealthCheckKind>().map_err(|e| {
                OperatorError::InvalidAnnotation(format!("{} on {}: {}", annotations::TYPE, key, e))
            })?,
            None if has_tls(self) => HealthCheckKind::Https,
            None => HealthCheckKind::Http,
        };

        let port = match values.get(annotations::PORT) {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(OperatorError::InvalidAnnotation(format!(
                        "{} on {}: {:?} is not a valid port",
                        annotations::PORT,
                        key,
                        raw
                    )))
                }
            },
            None => kind.default_port(),
        };

        let resource_path = match kind {
            HealthCheckKind::Tcp => None,
            HealthCheckKind::Http | HealthCheckKind::Https => {
                let path = values
                    .get(annotations::PATH)
                    .map(|p| p.trim().to_string())
                    .unwrap_or_else(|| "/".to_string());
                if !path.starts_with('/') {
                    return Err(OperatorError::InvalidAnnotation(format!(
                        "{} on {}: {:?} must start with '/'",
                        annotations::PATH,
                        key,
                        path
                    )));
                }
                Some(path)
            }
        };

        let fqdn = values
            .get(annotations::FQDN)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .or_else(|| first_rule_host(self))
            .or_else(|| first_load_balancer_address(self))
            .ok_or_else(|| {
                OperatorError::MissingEndpoint(format!(
                    "{} has no {} annotation, rule host or load balancer address",
                    key,
                    annotations::FQDN
                ))
            })?;

        Ok(HealthCheckSpec {
            kind,
            fqdn,
            port,
            resource_path,
        })
    }
}

/// Decide what to do with an ingress snapshot. Pure: no I/O.
pub fn plan(ingress: &Ingress) -> Result<Plan> {
    if ingress.is_deleting() {
        if ingress.has_finalizer() {
            return Ok(Plan::Finalize {
                health_check_id: ingress.health_check_id(),
                caller_reference: ingress.caller_reference(),
            });
        }
        return Ok(Plan::Skip);
    }

    if ingress.is_enabled() {
        return Ok(Plan::Ensure {
            spec: ingress.desired_health_check()?,
            health_check_id: ingress.health_check_id(),
            caller_reference: ingress.caller_reference(),
        });
    }

    let health_check_id = ingress.health_check_id();
    let caller_reference = ingress.caller_reference();
    if health_check_id.is_some() || caller_reference.is_some() || ingress.has_finalizer() {
        return Ok(Plan::Retract {
            health_check_id,
            caller_reference,
        });
    }

    Ok(Plan::Skip)
}

fn non_empty_annotation(ingress: &Ingress, key: &str) -> Option<String> {
    ingress
        .annotations()
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn has_tls(ingress: &Ingress) -> bool {
    ingress
        .spec
        .as_ref()
        .and_then(|s| s.tls.as_ref())
        .is_some_and(|tls| !tls.is_empty())
}

fn first_rule_host(ingress: &Ingress) -> Option<String> {
    ingress
        .spec
        .as_ref()?
        .rules
        .as_ref()?
        .iter()
        .filter_map(|rule| rule.host.as_deref())
        .find(|host| !host.is_empty())
        .map(str::to_string)
}

fn first_load_balancer_address(ingress: &Ingress) -> Option<String> {
    ingress
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .iter()
        .find_map(|lb| lb.hostname.clone().or_else(|| lb.ip.clone()))
}
