// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Child process execution for helper programs

use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::constants::{exit_codes, exported};
use crate::error::{DeployError, Result};
use crate::types::AppIdentity;

/// Runs helper programs, exporting the application identity once it is known.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    identity: Option<AppIdentity>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner whose children see `NAME` and `NAMESPACE` in their environment
    pub fn with_identity(app: &AppIdentity) -> Self {
        Self {
            identity: Some(app.clone()),
        }
    }

    /// Run a program to completion with inherited stdio.
    #[instrument(skip(self))]
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let status = self
            .command(program, args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| DeployError::SpawnError {
                program: program.to_string(),
                source,
            })?;

        check_status(program, status)
    }

    /// Run a program and return its stdout with surrounding whitespace trimmed.
    #[instrument(skip(self))]
    pub async fn capture(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self
            .command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| DeployError::SpawnError {
                program: program.to_string(),
                source,
            })?;

        check_status(program, output.status)?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("{} printed {} bytes", program, stdout.len());
        Ok(stdout)
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(identity) = &self.identity {
            command
                .env(exported::NAME, &identity.name)
                .env(exported::NAMESPACE, &identity.namespace);
        }
        command
    }
}

fn check_status(program: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    let code = status.code().unwrap_or_else(|| {
        warn!("{} was terminated by a signal", program);
        exit_codes::GENERIC
    });
    Err(DeployError::HelperFailed {
        program: program.to_string(),
        code,
    })
}
