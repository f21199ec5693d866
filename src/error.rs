// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::io::ErrorKind;

use thiserror::Error;

use crate::constants::exit_codes;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("{program} exited with status {code}")]
    HelperFailed { program: String, code: i32 },

    #[error("Failed to run {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration value could not be resolved: {0}")]
    ConfigError(String),

    #[error("Application resource is incomplete: {0}")]
    ApplicationError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid value for property {property}: {message}")]
    InvalidValue { property: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Deployment step panicked: {0}")]
    Panicked(String),
}

impl DeployError {
    /// The process exit code this error should terminate the deployer with.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::HelperFailed { code, .. } => *code,
            DeployError::SpawnError { source, .. } => match source.kind() {
                ErrorKind::NotFound => exit_codes::NOT_FOUND,
                ErrorKind::PermissionDenied => exit_codes::NOT_EXECUTABLE,
                _ => exit_codes::GENERIC,
            },
            _ => exit_codes::GENERIC,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
