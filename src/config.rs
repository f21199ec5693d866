// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Result};
use std::env::{self, VarError};
use std::path::PathBuf;

use crate::constants::{defaults, FIELD_MANAGER};

/// Deployer configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub print_config: String,
    pub expand_config: String,
    pub create_manifests: String,
    pub set_ownership: String,
    pub clean_iam: String,
    /// Directory the manifest creator renders into
    pub manifest_dir: PathBuf,
    /// Combined manifest produced by the ownership setter and applied to the cluster
    pub resources_file: PathBuf,
    /// Schema and raw values used to resolve the application identity without expansion
    pub schema_file: PathBuf,
    pub values_dir: PathBuf,
    pub field_manager: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            print_config: defaults::PRINT_CONFIG.to_string(),
            expand_config: defaults::EXPAND_CONFIG.to_string(),
            create_manifests: defaults::CREATE_MANIFESTS.to_string(),
            set_ownership: defaults::SET_OWNERSHIP.to_string(),
            clean_iam: defaults::CLEAN_IAM.to_string(),
            manifest_dir: PathBuf::from(defaults::MANIFEST_DIR),
            resources_file: PathBuf::from(defaults::RESOURCES_FILE),
            schema_file: PathBuf::from(defaults::SCHEMA_FILE),
            values_dir: PathBuf::from(defaults::VALUES_DIR),
            field_manager: FIELD_MANAGER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Build the configuration from an arbitrary variable lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let var = |key: &str, default: String| -> Result<String> {
            match lookup(key) {
                Ok(value) if !value.trim().is_empty() => Ok(value),
                Ok(_) | Err(VarError::NotPresent) => Ok(default),
                Err(VarError::NotUnicode(_)) => bail!("{} environment variable is not valid unicode", key),
            }
        };
        let path = |key: &str, default: PathBuf| -> Result<PathBuf> {
            var(key, default.to_string_lossy().into_owned()).map(PathBuf::from)
        };

        let defaults = Config::default();
        Ok(Config {
            print_config: var("DEPLOYER_PRINT_CONFIG", defaults.print_config)?,
            expand_config: var("DEPLOYER_EXPAND_CONFIG", defaults.expand_config)?,
            create_manifests: var("DEPLOYER_CREATE_MANIFESTS", defaults.create_manifests)?,
            set_ownership: var("DEPLOYER_SET_OWNERSHIP", defaults.set_ownership)?,
            clean_iam: var("DEPLOYER_CLEAN_IAM", defaults.clean_iam)?,
            manifest_dir: path("DEPLOYER_MANIFEST_DIR", defaults.manifest_dir)?,
            resources_file: path("DEPLOYER_RESOURCES_FILE", defaults.resources_file)?,
            schema_file: path("DEPLOYER_SCHEMA_FILE", defaults.schema_file)?,
            values_dir: path("DEPLOYER_VALUES_DIR", defaults.values_dir)?,
            field_manager: var("DEPLOYER_FIELD_MANAGER", defaults.field_manager)?,
        })
    }
}
