// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Compensating action run once when any deployment step fails

use std::any::Any;
use tracing::{error, info, warn};

use crate::deploy::pipeline::{resolve_identity, Collaborators};
use crate::types::{AppIdentity, AssemblyPhase};

/// Resolve the identity without depending on any earlier step.
///
/// Tries the schema and raw values first, then the config reader in raw mode.
pub async fn fallback_identity(tools: &Collaborators) -> Option<AppIdentity> {
    match resolve_identity(tools.fallback_reader.as_ref()).await {
        Ok(app) => return Some(app),
        Err(e) => warn!("Could not resolve application from raw values: {}", e),
    }

    match resolve_identity(tools.config_reader.as_ref()).await {
        Ok(app) => Some(app),
        Err(e) => {
            error!("Could not resolve application name and namespace: {}", e);
            None
        }
    }
}

/// Mark the Application as Failed, resolving its identity first if it was never known.
pub async fn mark_failed(tools: &Collaborators, identity: Option<AppIdentity>) {
    let app = match identity {
        Some(app) => app,
        None => {
            info!("Application identity unknown, using fallback resolution");
            match fallback_identity(tools).await {
                Some(app) => app,
                None => {
                    error!("Cannot mark the Application as Failed without its name and namespace");
                    return;
                }
            }
        }
    };

    if let Err(e) = tools
        .cluster
        .patch_assembly_phase(&app, AssemblyPhase::Failed)
        .await
    {
        error!("Failed to mark Application {} as Failed: {}", app, e);
    }
}

pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
