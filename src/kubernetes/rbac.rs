// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster-scoped RBAC objects created for an application.
//!
//! Owner references on cluster-scoped objects would let the garbage collector delete them
//! together with the namespaced Application, so the deployer strips them after the
//! ownership setter has run.

use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use kube::{
    api::{ListParams, Patch, PatchParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::fmt::{self, Debug};
use tracing::{debug, info, instrument};

use crate::constants::labels;
use crate::error::Result;

const RBAC_GROUP: &str = "rbac.authorization.k8s.io";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RbacKind {
    ClusterRole,
    ClusterRoleBinding,
}

impl RbacKind {
    /// Processing order of the detach step
    pub const ALL: [RbacKind; 2] = [RbacKind::ClusterRole, RbacKind::ClusterRoleBinding];

    pub fn plural(&self) -> &'static str {
        match self {
            RbacKind::ClusterRole => "clusterroles",
            RbacKind::ClusterRoleBinding => "clusterrolebindings",
        }
    }
}

impl fmt::Display for RbacKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Update,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Update => "update",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label selector matching everything deployed for `app_name`
pub fn owned_selector(app_name: &str) -> String {
    format!("{}={}", labels::APP_NAME, app_name)
}

/// Merge patch body removing all owner references
pub fn owner_reference_patch() -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "ownerReferences": null,
        }
    })
}

fn access_review(verb: Verb, kind: RbacKind) -> SelfSubjectAccessReview {
    SelfSubjectAccessReview {
        spec: SelfSubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                group: Some(RBAC_GROUP.to_string()),
                resource: Some(kind.plural().to_string()),
                verb: Some(verb.as_str().to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Check a single verb on an RBAC kind with a SelfSubjectAccessReview
#[instrument(skip(client))]
pub async fn can_i(client: &Client, verb: Verb, kind: RbacKind) -> Result<bool> {
    let reviews: Api<SelfSubjectAccessReview> = Api::all(client.clone());
    let review = reviews
        .create(&PostParams::default(), &access_review(verb, kind))
        .await?;

    let allowed = review.status.is_some_and(|s| s.allowed);
    debug!("can-i {} {}: {}", verb, kind, allowed);
    Ok(allowed)
}

#[instrument(skip(client))]
pub async fn list_owned(client: &Client, kind: RbacKind, app_name: &str) -> Result<Vec<String>> {
    let selector = owned_selector(app_name);
    match kind {
        RbacKind::ClusterRole => list_names::<ClusterRole>(client, &selector).await,
        RbacKind::ClusterRoleBinding => list_names::<ClusterRoleBinding>(client, &selector).await,
    }
}

#[instrument(skip(client))]
pub async fn clear_owner_references(client: &Client, kind: RbacKind, name: &str) -> Result<()> {
    match kind {
        RbacKind::ClusterRole => merge_patch::<ClusterRole>(client, name).await?,
        RbacKind::ClusterRoleBinding => merge_patch::<ClusterRoleBinding>(client, name).await?,
    }
    info!("Removed owner references from {}/{}", kind, name);
    Ok(())
}

async fn list_names<K>(client: &Client, selector: &str) -> Result<Vec<String>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let api: Api<K> = Api::all(client.clone());
    let list = api.list(&ListParams::default().labels(selector)).await?;
    Ok(list.items.iter().map(|item| item.name_any()).collect())
}

async fn merge_patch<K>(client: &Client, name: &str) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let api: Api<K> = Api::all(client.clone());
    api.patch(
        name,
        &PatchParams::default(),
        &Patch::Merge(&owner_reference_patch()),
    )
    .await?;
    Ok(())
}
