// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolve configuration values straight from the schema and raw values, without any
//! helper program or prior expansion.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{DeployError, Result};
use crate::schema::Schema;
use crate::tools::{ConfigReader, ValuesMode, XType};

/// A directory holding one file per property, the file content being the raw value.
#[derive(Debug, Clone)]
pub struct ValuesDir {
    root: PathBuf,
}

impl ValuesDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read the value of `property`, or `None` if no value was supplied.
    pub async fn read(&self, property: &str) -> Result<Option<String>> {
        if property.is_empty() || property.contains(['/', '\\']) || property.starts_with('.') {
            return Err(DeployError::ConfigError(format!(
                "invalid property name {:?}",
                property
            )));
        }

        match tokio::fs::read_to_string(self.root.join(property)).await {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process [`ConfigReader`] over `schema.yaml` and the raw values directory.
#[derive(Debug, Clone)]
pub struct SchemaConfigReader {
    schema_file: PathBuf,
    values: ValuesDir,
}

impl SchemaConfigReader {
    pub fn new(schema_file: &Path, values_dir: &Path) -> Self {
        Self {
            schema_file: schema_file.to_path_buf(),
            values: ValuesDir::new(values_dir),
        }
    }
}

#[async_trait]
impl ConfigReader for SchemaConfigReader {
    #[instrument(skip(self))]
    async fn read(&self, xtype: XType, mode: ValuesMode) -> Result<String> {
        if mode != ValuesMode::Raw {
            return Err(DeployError::ConfigError(format!(
                "schema reader only serves raw values, {} requested",
                mode.as_arg()
            )));
        }

        let schema = Schema::load_yaml_file(&self.schema_file).await?;
        let property = schema.property_by_xtype(xtype.as_str())?;

        let value = match self.values.read(&property.name).await? {
            Some(raw) => property.str_to_type(&raw)?.to_string(),
            None => property
                .default
                .as_ref()
                .map(ToString::to_string)
                .ok_or_else(|| {
                    DeployError::ConfigError(format!(
                        "no value or default for property {}",
                        property.name
                    ))
                })?,
        };

        if value.is_empty() {
            return Err(DeployError::ConfigError(format!(
                "property {} is empty",
                property.name
            )));
        }

        debug!("Resolved {} from property {}", xtype, property.name);
        Ok(value)
    }
}
