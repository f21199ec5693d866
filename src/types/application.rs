// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "app.k8s.io", version = "v1beta1", kind = "Application")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_phase: Option<AssemblyPhase>,
}

/// Deployment progress reported on the Application resource
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum AssemblyPhase {
    Pending,
    Success,
    Failed,
}

impl AssemblyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyPhase::Pending => "Pending",
            AssemblyPhase::Success => "Success",
            AssemblyPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for AssemblyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge patch body setting the assembly phase of an Application
pub fn assembly_phase_patch(phase: AssemblyPhase) -> serde_json::Value {
    serde_json::json!({
        "spec": {
            "assemblyPhase": phase,
        }
    })
}
