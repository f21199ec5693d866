// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequential deployment of one application into one namespace.
//!
//! Every step runs to completion before the next starts and the first failure aborts the
//! rest. The whole sequence is wrapped in a single guard: whether a step returns an error
//! or panics, the Application is marked `Failed` exactly once and the run reports the
//! failing step's exit code.

use futures::FutureExt;
use kube::Client;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::deploy::failure::{mark_failed, panic_message};
use crate::deploy::Step;
use crate::error::{DeployError, Result};
use crate::kubernetes::{ClusterOps, KubeCluster, RbacKind, Verb};
use crate::schema::SchemaConfigReader;
use crate::tools::{
    AssemblyPhaseSetter, ConfigExpander, ConfigReader, HelperTools, IamCleaner, ManifestCreator,
    ManifestPhaseWriter, OwnershipRequest, OwnershipSetter, ValuesMode, XType,
};
use crate::types::{AppIdentity, AssemblyPhase};

/// Everything the pipeline talks to
pub struct Collaborators {
    pub config_reader: Box<dyn ConfigReader>,
    /// Degraded reader used when the identity was never resolved
    pub fallback_reader: Box<dyn ConfigReader>,
    pub expander: Box<dyn ConfigExpander>,
    pub manifest_creator: Box<dyn ManifestCreator>,
    pub ownership_setter: Box<dyn OwnershipSetter>,
    pub phase_setter: Box<dyn AssemblyPhaseSetter>,
    pub iam_cleaner: Box<dyn IamCleaner>,
    pub cluster: Box<dyn ClusterOps>,
}

impl Collaborators {
    /// Helper programs from the deployer image and a live cluster connection
    pub fn production(config: &Config, client: Client) -> Self {
        let helpers = HelperTools::new(config.clone());
        Self {
            config_reader: Box::new(helpers.clone()),
            fallback_reader: Box::new(SchemaConfigReader::new(
                &config.schema_file,
                &config.values_dir,
            )),
            expander: Box::new(helpers.clone()),
            manifest_creator: Box::new(helpers.clone()),
            ownership_setter: Box::new(helpers.clone()),
            phase_setter: Box::new(ManifestPhaseWriter::new()),
            iam_cleaner: Box::new(helpers),
            cluster: Box::new(KubeCluster::new(client, config.field_manager.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Succeeded,
    Failed { step: Step, exit_code: i32 },
}

impl DeployOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployOutcome::Succeeded => 0,
            DeployOutcome::Failed { exit_code, .. } => *exit_code,
        }
    }
}

/// Progress of the current run, inspected by the failure guard
struct RunState {
    step: Step,
    identity: Option<AppIdentity>,
}

/// Resolve name and namespace from raw configuration values.
pub async fn resolve_identity(reader: &dyn ConfigReader) -> Result<AppIdentity> {
    let name = reader.read(XType::Name, ValuesMode::Raw).await?;
    let namespace = reader.read(XType::Namespace, ValuesMode::Raw).await?;

    if name.is_empty() || namespace.is_empty() {
        return Err(DeployError::ConfigError(
            "application name and namespace must not be empty".to_string(),
        ));
    }
    Ok(AppIdentity::new(name, namespace))
}

pub struct Pipeline {
    config: Config,
    tools: Collaborators,
}

impl Pipeline {
    pub fn new(config: Config, tools: Collaborators) -> Self {
        Self { config, tools }
    }

    /// Run the deployment, marking the Application `Failed` on any error or panic.
    pub async fn run(&self) -> DeployOutcome {
        let mut state = RunState {
            step: Step::ResolveIdentity,
            identity: None,
        };

        let result = AssertUnwindSafe(self.execute(&mut state))
            .catch_unwind()
            .await;

        let error = match result {
            Ok(Ok(())) => return DeployOutcome::Succeeded,
            Ok(Err(error)) => error,
            Err(panic) => DeployError::Panicked(panic_message(panic.as_ref())),
        };

        let step = state.step;
        let exit_code = error.exit_code();
        error!(step = %step, exit_code, "Deployment failed: {}", error);

        mark_failed(&self.tools, state.identity.take()).await;
        DeployOutcome::Failed { step, exit_code }
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let tools = &self.tools;

        state.step = Step::ResolveIdentity;
        let app = resolve_identity(tools.config_reader.as_ref()).await?;
        info!("Deploying application {}", app);
        state.identity = Some(app.clone());

        state.step = Step::ReadApplication;
        let app_ref = tools.cluster.application_ref(&app).await?;

        state.step = Step::ExpandConfig;
        tools.expander.expand(&app, &app_ref.uid).await?;

        state.step = Step::CreateManifests;
        tools.manifest_creator.create_manifests(&app).await?;

        state.step = Step::SetOwnership;
        tools
            .ownership_setter
            .set_ownership(OwnershipRequest {
                app: &app,
                app_ref: &app_ref,
                manifest_dir: &self.config.manifest_dir,
                dest: &self.config.resources_file,
            })
            .await?;

        state.step = Step::DetachClusterRbac;
        self.detach_cluster_rbac(&app).await?;

        state.step = Step::MarkPending;
        tools
            .phase_setter
            .set_phase(&self.config.resources_file, AssemblyPhase::Pending)
            .await?;

        state.step = Step::Apply;
        tools
            .cluster
            .apply_manifest(&app.namespace, &self.config.resources_file)
            .await?;

        state.step = Step::MarkSuccess;
        tools
            .cluster
            .patch_assembly_phase(&app, AssemblyPhase::Success)
            .await?;

        state.step = Step::CleanIam;
        tools.iam_cleaner.clean(&app).await?;

        info!("Application {} deployed successfully", app);
        Ok(())
    }

    /// Strip owner references from cluster-scoped RBAC objects of the application, for
    /// each kind the current credentials may both read and update.
    async fn detach_cluster_rbac(&self, app: &AppIdentity) -> Result<()> {
        for kind in RbacKind::ALL {
            if !self.may_modify(kind).await {
                info!("Not permitted to get and update {}, skipping", kind);
                continue;
            }

            let names = self.tools.cluster.list_owned(kind, &app.name).await?;
            info!("Detaching {} {} from Application {}", names.len(), kind, app);
            for name in &names {
                self.tools.cluster.clear_owner_references(kind, name).await?;
            }
        }
        Ok(())
    }

    async fn may_modify(&self, kind: RbacKind) -> bool {
        for verb in [Verb::Get, Verb::Update] {
            match self.tools.cluster.can_i(verb, kind).await {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    warn!("Access review for {} {} failed: {}", verb, kind, e);
                    return false;
                }
            }
        }
        true
    }
}
