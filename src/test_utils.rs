// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API, ingress fixtures and an in-memory provider.

use crate::error::ProviderError;
use crate::provider::HealthCheckProvider;
use crate::types::{CreateRequest, HealthCheckRecord, HealthCheckSpec};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Number of requests received with the given method
    pub fn requests(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path));

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                        .to_string(),
                )
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock ingress JSON response
pub fn ingress_json(name: &str, namespace: &str) -> String {
    serde_json::json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Build an ingress in the default namespace with a rule host of `<name>.example.com`
pub fn make_ingress(name: &str, annotations: &[(&str, &str)], finalizers: &[&str]) -> Ingress {
    let mut ingress: Ingress = serde_json::from_value(serde_json::json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": "default",
            "uid": format!("uid-{}", name),
            "resourceVersion": "7"
        },
        "spec": {
            "rules": [{ "host": format!("{}.example.com", name) }]
        }
    }))
    .unwrap();

    if !annotations.is_empty() {
        ingress.metadata.annotations = Some(
            annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }
    if !finalizers.is_empty() {
        ingress.metadata.finalizers = Some(finalizers.iter().map(|f| f.to_string()).collect());
    }
    ingress
}

/// Give an ingress a deletion timestamp
pub fn mark_deleted(ingress: &mut Ingress) {
    let time: Time = serde_json::from_value(serde_json::json!("2026-10-01T12:00:00Z")).unwrap();
    ingress.metadata.deletion_timestamp = Some(time);
}

#[derive(Default)]
struct FakeState {
    /// id -> (caller reference, spec)
    records: BTreeMap<String, (String, HealthCheckSpec)>,
    deleted_references: HashSet<String>,
    next_id: u32,
    creates: usize,
    updates: usize,
    deletes: usize,
    calls: usize,
    fail_next: Option<ProviderError>,
}

/// In-memory provider that mimics Route 53's caller reference semantics
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, caller_reference: &str, spec: HealthCheckSpec) {
        self.state
            .lock()
            .unwrap()
            .records
            .insert(id.to_string(), (caller_reference.to_string(), spec));
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: ProviderError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub fn deletes(&self) -> usize {
        self.state.lock().unwrap().deletes
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn live_records(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn spec_of(&self, id: &str) -> Option<HealthCheckSpec> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(id)
            .map(|(_, spec)| spec.clone())
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, FakeState>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl HealthCheckProvider for FakeProvider {
    async fn create(&self, request: &CreateRequest) -> Result<HealthCheckRecord, ProviderError> {
        let mut state = self.begin()?;
        state.creates += 1;

        if state.deleted_references.contains(&request.caller_reference) {
            return Err(ProviderError::Rejected("HealthCheckAlreadyExists".to_string()));
        }

        let existing = state
            .records
            .iter()
            .find(|(_, (reference, _))| *reference == request.caller_reference)
            .map(|(id, (_, spec))| (id.clone(), spec.clone()));
        if let Some((id, spec)) = existing {
            if spec != request.spec {
                return Err(ProviderError::Rejected("HealthCheckAlreadyExists".to_string()));
            }
            return Ok(HealthCheckRecord { id, spec: Some(spec) });
        }

        // Skip ids seeded through `insert`
        let id = loop {
            state.next_id += 1;
            let id = format!("hc-new-{}", state.next_id);
            if !state.records.contains_key(&id) {
                break id;
            }
        };
        state.records.insert(
            id.clone(),
            (request.caller_reference.clone(), request.spec.clone()),
        );
        Ok(HealthCheckRecord {
            id,
            spec: Some(request.spec.clone()),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<HealthCheckRecord>, ProviderError> {
        let state = self.begin()?;
        Ok(state.records.get(id).map(|(_, spec)| HealthCheckRecord {
            id: id.to_string(),
            spec: Some(spec.clone()),
        }))
    }

    async fn find_by_caller_reference(
        &self,
        caller_reference: &str,
    ) -> Result<Option<HealthCheckRecord>, ProviderError> {
        let state = self.begin()?;
        Ok(state
            .records
            .iter()
            .find(|(_, (reference, _))| reference == caller_reference)
            .map(|(id, (_, spec))| HealthCheckRecord {
                id: id.clone(),
                spec: Some(spec.clone()),
            }))
    }

    async fn update(&self, id: &str, spec: &HealthCheckSpec) -> Result<(), ProviderError> {
        let mut state = self.begin()?;
        state.updates += 1;
        match state.records.get_mut(id) {
            Some((_, current)) => {
                *current = spec.clone();
                Ok(())
            }
            None => Err(ProviderError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, ProviderError> {
        let mut state = self.begin()?;
        state.deletes += 1;
        match state.records.remove(id) {
            Some((reference, _)) => {
                state.deleted_references.insert(reference);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthCheckKind, ResourceKey};

    fn request(caller_reference: &str) -> CreateRequest {
        CreateRequest {
            owner: ResourceKey::new("default", "ingress-a"),
            owner_uid: "uid-ingress-a".to_string(),
            caller_reference: caller_reference.to_string(),
            spec: HealthCheckSpec {
                kind: HealthCheckKind::Http,
                fqdn: "ingress-a.example.com".to_string(),
                port: 80,
                resource_path: Some("/".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_fake_provider_keeps_seeded_records() {
        let provider = FakeProvider::new();
        provider.insert("hc-new-1", "ref-seeded", request("ref-seeded").spec);

        let record = provider.create(&request("ref-a")).await.unwrap();

        assert_ne!(record.id, "hc-new-1");
        assert_eq!(provider.live_records(), 2);
    }

    #[tokio::test]
    async fn test_fake_provider_refuses_deleted_reference() {
        let provider = FakeProvider::new();
        let record = provider.create(&request("ref-a")).await.unwrap();
        provider.delete(&record.id).await.unwrap();

        let err = provider.create(&request("ref-a")).await.unwrap_err();

        assert!(!err.is_retryable());
    }
}
