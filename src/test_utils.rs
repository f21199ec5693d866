// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and deployment collaborators.

use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

use crate::error::{DeployError, Result};
use crate::kubernetes::{ClusterOps, RbacKind, Verb};
use crate::tools::{
    AssemblyPhaseSetter, ConfigExpander, ConfigReader, IamCleaner, ManifestCreator,
    OwnershipRequest, OwnershipSetter, ValuesMode, XType,
};
use crate::types::{AppIdentity, ApplicationRef, AssemblyPhase};

/// A mock HTTP service that returns predefined responses based on request paths
/// and records every request it receives.
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

    /// Add a response for requests with `method` matching the path or a prefix of it
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Method and path, with any query string, of every request received so far, in order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Longest registered prefix wins
        responses
            .iter()
            .filter(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .max_by_key(|((_, p), _)| p.len())
            .map(|(_, resp)| resp.clone())
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
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let uri = match req.uri().query().filter(|q| !q.is_empty()) {
            Some(query) => format!("{}?{}", path, query),
            None => path.clone(),
        };

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, uri));

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock Application JSON response
pub fn application_json(name: &str, namespace: &str, uid: Option<&str>) -> String {
    let mut metadata = serde_json::json!({
        "name": name,
        "namespace": namespace,
        "labels": { "app.kubernetes.io/name": name },
    });
    if let Some(uid) = uid {
        metadata["uid"] = serde_json::json!(uid);
    }
    serde_json::json!({
        "apiVersion": "app.k8s.io/v1beta1",
        "kind": "Application",
        "metadata": metadata,
        "spec": {
            "descriptor": { "type": "WordPress" },
            "addOwnerRef": true,
        }
    })
    .to_string()
}

/// Create a SelfSubjectAccessReview response
pub fn access_review_json(allowed: bool) -> String {
    serde_json::json!({
        "apiVersion": "authorization.k8s.io/v1",
        "kind": "SelfSubjectAccessReview",
        "metadata": {},
        "spec": {
            "resourceAttributes": {
                "group": "rbac.authorization.k8s.io",
                "resource": "clusterroles",
                "verb": "get",
            }
        },
        "status": { "allowed": allowed }
    })
    .to_string()
}

/// Create a ClusterRoleList response with the given role names
pub fn cluster_role_list_json(names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "rbac.authorization.k8s.io/v1",
                "kind": "ClusterRole",
                "metadata": {
                    "name": name,
                    "labels": { "app.kubernetes.io/name": "wordpress-1" },
                },
                "rules": [],
            })
        })
        .collect();
    serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRoleList",
        "metadata": { "resourceVersion": "1" },
        "items": items,
    })
    .to_string()
}

/// Create a ClusterRoleBinding response
pub fn cluster_role_binding_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRoleBinding",
        "metadata": { "name": name },
        "roleRef": {
            "apiGroup": "rbac.authorization.k8s.io",
            "kind": "ClusterRole",
            "name": name,
        },
    })
    .to_string()
}

/// Create an APIResourceList discovery response: `(plural, kind, namespaced)` per resource
pub fn api_resource_list_json(group_version: &str, resources: &[(&str, &str, bool)]) -> String {
    let resources: Vec<_> = resources
        .iter()
        .map(|(plural, kind, namespaced)| {
            serde_json::json!({
                "name": plural,
                "singularName": kind.to_lowercase(),
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"],
            })
        })
        .collect();
    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources,
    })
    .to_string()
}

/// Create a generic object response
pub fn object_json(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> String {
    let mut metadata = serde_json::json!({ "name": name });
    if let Some(namespace) = namespace {
        metadata["namespace"] = serde_json::json!(namespace);
    }
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": metadata,
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    failures: HashMap<String, i32>,
    failures_once: HashMap<String, i32>,
    denied: HashSet<(Verb, RbacKind)>,
    review_errors: HashSet<(Verb, RbacKind)>,
    owned: HashMap<RbacKind, Vec<String>>,
    panic_on: Option<String>,
}

/// Fake implementation of every deployment collaborator, recording calls in order.
///
/// Operations are keyed by a short name (`read:<label>`, `get-application`, `expand`,
/// `create-manifests`, `set-ownership`, `can-i`, `list`, `clear-owner-references`,
/// `set-phase`, `apply`, `patch-phase:<Phase>`, `clean-iam`); [`FakeDeployment::fail`]
/// makes the named operation return a helper failure with the given exit code.
#[derive(Clone)]
pub struct FakeDeployment {
    label: &'static str,
    identity: Option<AppIdentity>,
    app_ref: ApplicationRef,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDeployment {
    pub fn new(identity: AppIdentity, app_ref: ApplicationRef) -> Self {
        Self {
            label: "print-config",
            identity: Some(identity),
            app_ref,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// The canonical `wordpress-1` scenario
    pub fn wordpress() -> Self {
        Self::new(
            AppIdentity::new("wordpress-1", "default"),
            ApplicationRef {
                uid: "abc-123".to_string(),
                api_version: "app.k8s.io/v1beta1".to_string(),
            },
        )
    }

    /// A config reader sharing this call log, recorded under `label`
    pub fn reader(&self, label: &'static str, identity: Option<AppIdentity>) -> Self {
        Self {
            label,
            identity,
            app_ref: self.app_ref.clone(),
            state: self.state.clone(),
        }
    }

    pub fn fail(self, operation: &str, code: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_string(), code);
        self
    }

    /// Like [`FakeDeployment::fail`], but only the first call of `operation` fails
    pub fn fail_once(self, operation: &str, code: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures_once
            .insert(operation.to_string(), code);
        self
    }

    pub fn panic_on(self, operation: &str) -> Self {
        self.state.lock().unwrap().panic_on = Some(operation.to_string());
        self
    }

    pub fn deny(self, verb: Verb, kind: RbacKind) -> Self {
        self.state.lock().unwrap().denied.insert((verb, kind));
        self
    }

    pub fn review_error(self, verb: Verb, kind: RbacKind) -> Self {
        self.state.lock().unwrap().review_errors.insert((verb, kind));
        self
    }

    pub fn owned(self, kind: RbacKind, names: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .owned
            .insert(kind, names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, operation: &str, call: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.panic_on.as_deref() == Some(operation) {
            drop(state);
            panic!("{} blew up", operation);
        }
        let code = match state.failures_once.remove(operation) {
            Some(code) => Some(code),
            None => state.failures.get(operation).copied(),
        };
        match code {
            Some(code) => Err(DeployError::HelperFailed {
                program: operation.to_string(),
                code,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConfigReader for FakeDeployment {
    async fn read(&self, xtype: XType, mode: ValuesMode) -> Result<String> {
        let operation = format!("read:{}", self.label);
        self.record(
            &operation,
            format!("{} {} {}", self.label, xtype, mode.as_arg()),
        )?;
        let identity = self
            .identity
            .as_ref()
            .ok_or_else(|| DeployError::ConfigError(format!("{} has no values", self.label)))?;
        Ok(match xtype {
            XType::Name => identity.name.clone(),
            XType::Namespace => identity.namespace.clone(),
        })
    }
}

#[async_trait]
impl ConfigExpander for FakeDeployment {
    async fn expand(&self, _app: &AppIdentity, app_uid: &str) -> Result<()> {
        self.record("expand", format!("expand app_uid={}", app_uid))
    }
}

#[async_trait]
impl ManifestCreator for FakeDeployment {
    async fn create_manifests(&self, app: &AppIdentity) -> Result<()> {
        self.record("create-manifests", format!("create-manifests {}", app.name))
    }
}

#[async_trait]
impl OwnershipSetter for FakeDeployment {
    async fn set_ownership(&self, request: OwnershipRequest<'_>) -> Result<()> {
        self.record(
            "set-ownership",
            format!(
                "set-ownership {} {} {} {} -> {}",
                request.app.name,
                request.app_ref.uid,
                request.app_ref.api_version,
                request.manifest_dir.display(),
                request.dest.display()
            ),
        )
    }
}

#[async_trait]
impl AssemblyPhaseSetter for FakeDeployment {
    async fn set_phase(&self, manifest: &Path, phase: AssemblyPhase) -> Result<()> {
        self.record("set-phase", format!("set-phase {} {}", phase, manifest.display()))
    }
}

#[async_trait]
impl IamCleaner for FakeDeployment {
    async fn clean(&self, app: &AppIdentity) -> Result<()> {
        self.record("clean-iam", format!("clean-iam {}", app.name))
    }
}

#[async_trait]
impl ClusterOps for FakeDeployment {
    async fn application_ref(&self, app: &AppIdentity) -> Result<ApplicationRef> {
        self.record("get-application", format!("get-application {}", app))?;
        Ok(self.app_ref.clone())
    }

    async fn can_i(&self, verb: Verb, kind: RbacKind) -> Result<bool> {
        self.record("can-i", format!("can-i {} {}", verb, kind))?;
        let state = self.state.lock().unwrap();
        if state.review_errors.contains(&(verb, kind)) {
            return Err(DeployError::ConfigError("access review unavailable".to_string()));
        }
        Ok(!state.denied.contains(&(verb, kind)))
    }

    async fn list_owned(&self, kind: RbacKind, app_name: &str) -> Result<Vec<String>> {
        self.record(
            "list",
            format!("list {} app.kubernetes.io/name={}", kind, app_name),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state.owned.get(&kind).cloned().unwrap_or_default())
    }

    async fn clear_owner_references(&self, kind: RbacKind, name: &str) -> Result<()> {
        self.record(
            "clear-owner-references",
            format!("clear-owner-references {}/{}", kind, name),
        )
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()> {
        self.record("apply", format!("apply {} {}", namespace, manifest.display()))
    }

    async fn patch_assembly_phase(&self, app: &AppIdentity, phase: AssemblyPhase) -> Result<()> {
        self.record(
            &format!("patch-phase:{}", phase),
            format!("patch-phase {} {}", app, phase),
        )
    }
}
