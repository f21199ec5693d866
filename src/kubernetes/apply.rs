// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply of a combined multi-document manifest

use kube::{
    api::{ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams},
    discovery::{self, ApiCapabilities, Scope},
    Api, Client,
};
use serde_yaml::Value;
use std::collections::hash_map::{Entry, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{DeployError, Result};
use crate::tools::manifest::parse_documents;

const LIST_KIND: &str = "List";

/// Parse a manifest into objects, flattening `kind: List` documents.
pub fn manifest_objects(content: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in parse_documents(content)? {
        if document.get("kind").and_then(Value::as_str) == Some(LIST_KIND) {
            let items = match document.get("items") {
                Some(Value::Sequence(items)) => items.clone(),
                Some(Value::Null) | None => Vec::new(),
                Some(_) => {
                    return Err(DeployError::ManifestError(
                        "List items must be a sequence".to_string(),
                    ))
                }
            };
            for item in items {
                objects.push(to_object(item)?);
            }
        } else {
            objects.push(to_object(document)?);
        }
    }
    Ok(objects)
}

fn to_object(document: Value) -> Result<DynamicObject> {
    let object: DynamicObject = serde_yaml::from_value(document)
        .map_err(|e| DeployError::ManifestError(format!("Invalid resource: {}", e)))?;
    if object.metadata.name.as_deref().unwrap_or_default().is_empty() {
        return Err(DeployError::ManifestError(
            "Resource without metadata.name".to_string(),
        ));
    }
    Ok(object)
}

/// Group, version and kind of a parsed object
pub fn object_gvk(object: &DynamicObject) -> Result<GroupVersionKind> {
    let types = object
        .types
        .as_ref()
        .filter(|t| !t.api_version.is_empty() && !t.kind.is_empty())
        .ok_or_else(|| {
            DeployError::ManifestError(format!(
                "Resource {} is missing apiVersion or kind",
                object.metadata.name.as_deref().unwrap_or_default()
            ))
        })?;

    let (group, version) = types
        .api_version
        .split_once('/')
        .unwrap_or(("", types.api_version.as_str()));
    Ok(GroupVersionKind::gvk(group, version, &types.kind))
}

fn kind_key(gvk: &GroupVersionKind) -> String {
    format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
}

/// Apply every object of the manifest at `path`
#[instrument(skip(client, field_manager))]
pub async fn apply_manifest(
    client: &Client,
    field_manager: &str,
    namespace: &str,
    path: &Path,
) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DeployError::ManifestError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let objects = manifest_objects(&content)?;

    info!("Applying {} resources from {}", objects.len(), path.display());

    let params = PatchParams::apply(field_manager).force();
    let mut kinds: HashMap<String, (ApiResource, ApiCapabilities)> = HashMap::new();

    for mut object in objects {
        let gvk = object_gvk(&object)?;
        let (resource, capabilities) = match kinds.entry(kind_key(&gvk)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(resolve_kind(client, &gvk).await?),
        };

        let name = object.metadata.name.clone().unwrap_or_default();
        let api: Api<DynamicObject> = match capabilities.scope {
            Scope::Namespaced => {
                match object.metadata.namespace.as_deref() {
                    Some(ns) if ns != namespace => {
                        return Err(DeployError::ManifestError(format!(
                            "{} {} is in namespace {}, expected {}",
                            gvk.kind, name, ns, namespace
                        )));
                    }
                    _ => object.metadata.namespace = Some(namespace.to_string()),
                }
                Api::namespaced_with(client.clone(), namespace, resource)
            }
            Scope::Cluster => Api::all_with(client.clone(), resource),
        };

        api.patch(&name, &params, &Patch::Apply(&object)).await?;
        debug!("Applied {} {}", gvk.kind, name);
    }

    info!("Applied manifest {} to namespace {}", path.display(), namespace);
    Ok(())
}

async fn resolve_kind(
    client: &Client,
    gvk: &GroupVersionKind,
) -> Result<(ApiResource, ApiCapabilities)> {
    match discovery::pinned_kind(client, gvk).await {
        Ok(resolved) => Ok(resolved),
        Err(kube::Error::Discovery(e)) => Err(DeployError::UnknownKind(format!(
            "{}: {}",
            kind_key(gvk),
            e
        ))),
        Err(e) => Err(e.into()),
    }
}
