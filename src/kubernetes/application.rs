// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reads and status patches on the Application resource

use kube::{
    api::{ApiResource, DynamicObject, Patch, PatchParams},
    Api, Client, Resource,
};
use tracing::{info, instrument};

use crate::error::{DeployError, Result};
use crate::types::application::assembly_phase_patch;
use crate::types::{AppIdentity, Application, ApplicationRef, AssemblyPhase};

/// Get the uid and served apiVersion of the Application
#[instrument(skip(client), fields(app = %app))]
pub async fn get_application_ref(client: &Client, app: &AppIdentity) -> Result<ApplicationRef> {
    let resource = ApiResource::erase::<Application>(&());
    let applications: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), &app.namespace, &resource);

    let application = applications.get(&app.name).await?;

    let Some(uid) = application.metadata.uid.filter(|uid| !uid.is_empty()) else {
        return Err(DeployError::ApplicationError(format!(
            "Application {} has no metadata.uid",
            app
        )));
    };

    let api_version = application
        .types
        .map(|t| t.api_version)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| Application::api_version(&()).into_owned());

    info!("Application {} has uid {} ({})", app, uid, api_version);
    Ok(ApplicationRef { uid, api_version })
}

/// Merge-patch `spec.assemblyPhase` of the live Application
#[instrument(skip(client), fields(app = %app))]
pub async fn patch_assembly_phase(
    client: &Client,
    app: &AppIdentity,
    phase: AssemblyPhase,
) -> Result<()> {
    let applications: Api<Application> = Api::namespaced(client.clone(), &app.namespace);

    applications
        .patch(
            &app.name,
            &PatchParams::default(),
            &Patch::Merge(&assembly_phase_patch(phase)),
        )
        .await?;

    info!("Application {} assembly phase set to {}", app, phase);
    Ok(())
}
