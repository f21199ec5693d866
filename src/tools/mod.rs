// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Collaborators the deployment pipeline drives, one trait per invocation.
//!
//! Helper programs shipped in the deployer image are run as child processes by
//! [`HelperTools`]; the assembly phase is rewritten in-process by [`ManifestPhaseWriter`].

pub mod helpers;
pub mod manifest;
pub mod process;

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::types::{AppIdentity, ApplicationRef, AssemblyPhase};

pub use helpers::HelperTools;
pub use manifest::ManifestPhaseWriter;
pub use process::ProcessRunner;

/// Which set of configuration values a lookup is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuesMode {
    /// Values as supplied by the user, before expansion
    Raw,
    /// Values after expansion (generated passwords, defaults, ...)
    Expanded,
}

impl ValuesMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            ValuesMode::Raw => "raw",
            ValuesMode::Expanded => "expanded",
        }
    }
}

/// Marketplace extension type identifying a well-known configuration property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XType {
    Name,
    Namespace,
}

impl XType {
    pub fn as_str(&self) -> &'static str {
        match self {
            XType::Name => "NAME",
            XType::Namespace => "NAMESPACE",
        }
    }
}

impl fmt::Display for XType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments handed to the ownership setter
#[derive(Debug, Clone, Copy)]
pub struct OwnershipRequest<'a> {
    pub app: &'a AppIdentity,
    pub app_ref: &'a ApplicationRef,
    pub manifest_dir: &'a Path,
    pub dest: &'a Path,
}

#[async_trait]
pub trait ConfigReader: Send + Sync {
    /// Resolve the value of the property tagged with `xtype`.
    async fn read(&self, xtype: XType, mode: ValuesMode) -> Result<String>;
}

#[async_trait]
pub trait ConfigExpander: Send + Sync {
    async fn expand(&self, app: &AppIdentity, app_uid: &str) -> Result<()>;
}

#[async_trait]
pub trait ManifestCreator: Send + Sync {
    async fn create_manifests(&self, app: &AppIdentity) -> Result<()>;
}

#[async_trait]
pub trait OwnershipSetter: Send + Sync {
    /// Write a single combined manifest with owner references pointing at the Application.
    async fn set_ownership(&self, request: OwnershipRequest<'_>) -> Result<()>;
}

#[async_trait]
pub trait AssemblyPhaseSetter: Send + Sync {
    /// Set the assembly phase of the Application document inside `manifest`.
    async fn set_phase(&self, manifest: &Path, phase: AssemblyPhase) -> Result<()>;
}

#[async_trait]
pub trait IamCleaner: Send + Sync {
    async fn clean(&self, app: &AppIdentity) -> Result<()>;
}
