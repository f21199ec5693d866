// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API operations used during a deployment.

pub mod application;
pub mod apply;
pub mod rbac;

use async_trait::async_trait;
use kube::Client;
use std::path::Path;

use crate::error::Result;
use crate::types::{AppIdentity, ApplicationRef, AssemblyPhase};

pub use rbac::{RbacKind, Verb};

/// Cluster-side operations of the deployment pipeline.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Read `metadata.uid` and `apiVersion` of the live Application.
    async fn application_ref(&self, app: &AppIdentity) -> Result<ApplicationRef>;

    /// Ask the API server whether the current credentials may perform `verb` on `kind`.
    async fn can_i(&self, verb: Verb, kind: RbacKind) -> Result<bool>;

    /// Names of all objects of `kind` labeled as belonging to `app_name`.
    async fn list_owned(&self, kind: RbacKind, app_name: &str) -> Result<Vec<String>>;

    async fn clear_owner_references(&self, kind: RbacKind, name: &str) -> Result<()>;

    /// Apply every document of `manifest`, placing namespaced objects into `namespace`.
    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()>;

    async fn patch_assembly_phase(&self, app: &AppIdentity, phase: AssemblyPhase) -> Result<()>;
}

/// [`ClusterOps`] backed by a kube client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    field_manager: String,
}

impl KubeCluster {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }
}

#[async_trait]
impl ClusterOps for KubeCluster {
    async fn application_ref(&self, app: &AppIdentity) -> Result<ApplicationRef> {
        application::get_application_ref(&self.client, app).await
    }

    async fn can_i(&self, verb: Verb, kind: RbacKind) -> Result<bool> {
        rbac::can_i(&self.client, verb, kind).await
    }

    async fn list_owned(&self, kind: RbacKind, app_name: &str) -> Result<Vec<String>> {
        rbac::list_owned(&self.client, kind, app_name).await
    }

    async fn clear_owner_references(&self, kind: RbacKind, name: &str) -> Result<()> {
        rbac::clear_owner_references(&self.client, kind, name).await
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()> {
        apply::apply_manifest(&self.client, &self.field_manager, namespace, manifest).await
    }

    async fn patch_assembly_phase(&self, app: &AppIdentity, phase: AssemblyPhase) -> Result<()> {
        application::patch_assembly_phase(&self.client, app, phase).await
    }
}
