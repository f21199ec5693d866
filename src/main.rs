// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deployer::config::Config;
use deployer::deploy::{Collaborators, Pipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing, defaulting to info when RUST_LOG is unset
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting application deployer");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: resources_file={}, manifest_dir={}",
        config.resources_file.display(),
        config.manifest_dir.display()
    );

    // Create Kubernetes client
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let tools = Collaborators::production(&config, client);
    let outcome = Pipeline::new(config, tools).run().await;

    std::process::exit(outcome.exit_code());
}
