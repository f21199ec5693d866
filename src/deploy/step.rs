// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

/// The steps of a deployment, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ResolveIdentity,
    ReadApplication,
    ExpandConfig,
    CreateManifests,
    SetOwnership,
    DetachClusterRbac,
    MarkPending,
    Apply,
    MarkSuccess,
    CleanIam,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ResolveIdentity => "resolve-identity",
            Step::ReadApplication => "read-application",
            Step::ExpandConfig => "expand-config",
            Step::CreateManifests => "create-manifests",
            Step::SetOwnership => "set-ownership",
            Step::DetachClusterRbac => "detach-cluster-rbac",
            Step::MarkPending => "mark-pending",
            Step::Apply => "apply",
            Step::MarkSuccess => "mark-success",
            Step::CleanIam => "clean-iam",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
