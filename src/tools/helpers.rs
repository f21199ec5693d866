// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Helper programs shipped in the deployer image

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::{DeployError, Result};
use crate::tools::{
    ConfigExpander, ConfigReader, IamCleaner, ManifestCreator, OwnershipRequest, OwnershipSetter,
    ProcessRunner, ValuesMode, XType,
};
use crate::types::AppIdentity;

/// Drives the helper programs configured in [`Config`] as child processes.
#[derive(Debug, Clone)]
pub struct HelperTools {
    config: Config,
}

impl HelperTools {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigReader for HelperTools {
    async fn read(&self, xtype: XType, mode: ValuesMode) -> Result<String> {
        let value = ProcessRunner::new()
            .capture(
                &self.config.print_config,
                &["--xtype", xtype.as_str(), "--values_mode", mode.as_arg()],
            )
            .await?;

        if value.is_empty() {
            return Err(DeployError::ConfigError(format!(
                "{} printed no value for {}",
                self.config.print_config, xtype
            )));
        }
        Ok(value)
    }
}

#[async_trait]
impl ConfigExpander for HelperTools {
    async fn expand(&self, app: &AppIdentity, app_uid: &str) -> Result<()> {
        info!("Expanding configuration for application uid {}", app_uid);
        ProcessRunner::with_identity(app)
            .run(
                &self.config.expand_config,
                &["--values_mode", ValuesMode::Raw.as_arg(), "--app_uid", app_uid],
            )
            .await
    }
}

#[async_trait]
impl ManifestCreator for HelperTools {
    async fn create_manifests(&self, app: &AppIdentity) -> Result<()> {
        info!("Creating manifests for {}", app);
        ProcessRunner::with_identity(app)
            .run(&self.config.create_manifests, &[])
            .await
    }
}

#[async_trait]
impl OwnershipSetter for HelperTools {
    async fn set_ownership(&self, request: OwnershipRequest<'_>) -> Result<()> {
        let manifest_dir = request.manifest_dir.to_string_lossy();
        let dest = request.dest.to_string_lossy();

        info!("Assigning owner references, writing {}", dest);
        ProcessRunner::with_identity(request.app)
            .run(
                &self.config.set_ownership,
                &[
                    "--app_name",
                    &request.app.name,
                    "--app_uid",
                    &request.app_ref.uid,
                    "--app_api_version",
                    &request.app_ref.api_version,
                    "--manifests",
                    &manifest_dir,
                    "--dest",
                    &dest,
                ],
            )
            .await
    }
}

#[async_trait]
impl IamCleaner for HelperTools {
    async fn clean(&self, app: &AppIdentity) -> Result<()> {
        info!("Cleaning up IAM resources for {}", app);
        ProcessRunner::with_identity(app)
            .run(&self.config.clean_iam, &[])
            .await
    }
}
