// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Multi-document manifest handling and the in-place assembly phase rewrite

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DeployError, Result};
use crate::tools::AssemblyPhaseSetter;
use crate::types::AssemblyPhase;

const APPLICATION_KIND: &str = "Application";
const APPLICATION_GROUP: &str = "app.k8s.io/";

/// Split a YAML stream into its non-empty documents.
pub fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)
            .map_err(|e| DeployError::ManifestError(format!("Failed to parse manifest: {}", e)))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Render documents back into a single YAML stream.
pub fn render_documents(documents: &[Value]) -> Result<String> {
    let mut out = String::new();
    for document in documents {
        let rendered = serde_yaml::to_string(document)
            .map_err(|e| DeployError::ManifestError(format!("Failed to render manifest: {}", e)))?;
        out.push_str("---\n");
        out.push_str(&rendered);
    }
    Ok(out)
}

fn is_application(document: &Value) -> bool {
    let kind = document.get("kind").and_then(Value::as_str);
    let api_version = document.get("apiVersion").and_then(Value::as_str);
    kind == Some(APPLICATION_KIND) && api_version.is_some_and(|v| v.starts_with(APPLICATION_GROUP))
}

/// Set `spec.assemblyPhase` on every Application document, returning how many were changed.
pub fn set_assembly_phase(documents: &mut [Value], phase: AssemblyPhase) -> Result<usize> {
    let mut changed = 0;
    for document in documents.iter_mut().filter(|d| is_application(d)) {
        let Some(root) = document.as_mapping_mut() else {
            continue;
        };

        let spec = root
            .entry(Value::from("spec"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if spec.is_null() {
            *spec = Value::Mapping(Mapping::new());
        }
        let Some(spec) = spec.as_mapping_mut() else {
            return Err(DeployError::ManifestError(
                "Application spec is not a mapping".to_string(),
            ));
        };

        spec.insert(Value::from("assemblyPhase"), Value::from(phase.as_str()));
        changed += 1;
    }
    Ok(changed)
}

/// Rewrites the combined manifest on disk before it is applied.
#[derive(Debug, Clone, Default)]
pub struct ManifestPhaseWriter;

impl ManifestPhaseWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssemblyPhaseSetter for ManifestPhaseWriter {
    async fn set_phase(&self, manifest: &Path, phase: AssemblyPhase) -> Result<()> {
        let content = tokio::fs::read_to_string(manifest).await.map_err(|e| {
            DeployError::ManifestError(format!("Failed to read {}: {}", manifest.display(), e))
        })?;

        let mut documents = parse_documents(&content)?;
        let changed = set_assembly_phase(&mut documents, phase)?;
        if changed == 0 {
            warn!(
                "No Application found in {}, assembly phase left unchanged",
                manifest.display()
            );
            return Ok(());
        }

        debug!("Updated {} Application document(s)", changed);
        tokio::fs::write(manifest, render_documents(&documents)?)
            .await
            .map_err(|e| {
                DeployError::ManifestError(format!("Failed to write {}: {}", manifest.display(), e))
            })?;

        info!("Set assembly phase {} in {}", phase, manifest.display());
        Ok(())
    }
}
