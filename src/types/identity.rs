// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

/// Name and namespace of the Application being deployed.
///
/// Resolved once at the start of a run and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub namespace: String,
}

impl AppIdentity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Live coordinates of the Application resource, read from the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRef {
    pub uid: String,
    pub api_version: String,
}
