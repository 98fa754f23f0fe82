// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Metadata patches that link an ingress to its health check

use crate::constants::{annotations, FINALIZER, OPERATOR_NAME};
use crate::error::Result;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    api::{Patch, PatchParams},
    Api, ResourceExt,
};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

fn patch_params() -> PatchParams {
    PatchParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

/// Build a merge patch for our annotations and, optionally, the finalizer list.
///
/// The finalizer list is replaced wholesale, so such patches carry the snapshot's
/// resourceVersion and the API server answers 409 when the list moved underneath us.
fn metadata_patch(
    ingress: &Ingress,
    annotations: Map<String, Value>,
    finalizers: Option<Vec<String>>,
) -> Value {
    let mut metadata = Map::new();
    metadata.insert("annotations".to_string(), Value::Object(annotations));
    if let Some(finalizers) = finalizers {
        metadata.insert("finalizers".to_string(), json!(finalizers));
        if let Some(rv) = ingress.resource_version() {
            metadata.insert("resourceVersion".to_string(), json!(rv));
        }
    }
    json!({ "metadata": metadata })
}

async fn merge_metadata(
    api: &Api<Ingress>,
    ingress: &Ingress,
    annotations: Map<String, Value>,
    finalizers: Option<Vec<String>>,
) -> Result<()> {
    let patch = metadata_patch(ingress, annotations, finalizers);
    api.patch(&ingress.name_any(), &patch_params(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

fn with_finalizer(ingress: &Ingress) -> Vec<String> {
    let mut finalizers = ingress.finalizers().to_vec();
    if !finalizers.iter().any(|f| f == FINALIZER) {
        finalizers.push(FINALIZER.to_string());
    }
    finalizers
}

/// Store the idempotency token, the id it resolved to (or none yet) and our finalizer.
///
/// Claiming a fresh token clears any id left over from a replaced or vanished check.
#[instrument(skip(api, ingress), fields(ingress = %ingress.name_any()))]
pub async fn claim(
    api: &Api<Ingress>,
    ingress: &Ingress,
    caller_reference: &str,
    health_check_id: Option<&str>,
) -> Result<()> {
    let mut values = Map::new();
    values.insert(annotations::CALLER_REFERENCE.to_string(), json!(caller_reference));
    values.insert(annotations::HEALTH_CHECK_ID.to_string(), json!(health_check_id));

    merge_metadata(api, ingress, values, Some(with_finalizer(ingress))).await?;
    debug!("Claimed ingress with caller reference {}", caller_reference);
    Ok(())
}

/// Record the provider id of the health check owned by this ingress
#[instrument(skip(api, ingress), fields(ingress = %ingress.name_any()))]
pub async fn record_health_check(api: &Api<Ingress>, ingress: &Ingress, id: &str) -> Result<()> {
    let mut values = Map::new();
    values.insert(annotations::HEALTH_CHECK_ID.to_string(), json!(id));

    merge_metadata(api, ingress, values, None).await
}

/// Drop the ownership annotations and our finalizer
#[instrument(skip(api, ingress), fields(ingress = %ingress.name_any()))]
pub async fn release(api: &Api<Ingress>, ingress: &Ingress) -> Result<()> {
    let mut values = Map::new();
    values.insert(annotations::HEALTH_CHECK_ID.to_string(), Value::Null);
    values.insert(annotations::CALLER_REFERENCE.to_string(), Value::Null);

    let finalizers = ingress
        .finalizers()
        .iter()
        .filter(|f| *f != FINALIZER)
        .cloned()
        .collect();

    merge_metadata(api, ingress, values, Some(finalizers)).await
}
