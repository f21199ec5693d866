// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployer configuration schema (`schema.yaml`).
//!
//! The schema declares every configurable property of the packaged application, its
//! type and default, and marketplace extension types such as `NAME` or
//! `GENERATED_PASSWORD`.

pub mod reader;

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{DeployError, Result};

pub use reader::{SchemaConfigReader, ValuesDir};

const XTYPE_GENERATED_PASSWORD: &str = "GENERATED_PASSWORD";
const MARKETPLACE_KEY: &str = "x-google-marketplace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Int,
    Number,
    Boolean,
}

impl PropertyType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PropertyType::String),
            "int" | "integer" => Some(PropertyType::Int),
            "number" => Some(PropertyType::Number),
            "boolean" => Some(PropertyType::Boolean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Number(n) => write!(f, "{}", n),
            TypedValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Generation settings of a `GENERATED_PASSWORD` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordSettings {
    pub length: usize,
    pub include_symbols: bool,
    pub base64: bool,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            length: 10,
            include_symbols: false,
            base64: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub property_type: PropertyType,
    pub default: Option<TypedValue>,
    pub xtype: Option<String>,
    pub password: Option<PasswordSettings>,
}

impl Property {
    /// Convert a raw string value into this property's type.
    pub fn str_to_type(&self, raw: &str) -> Result<TypedValue> {
        let invalid = |message: String| DeployError::InvalidValue {
            property: self.name.clone(),
            message,
        };

        match self.property_type {
            PropertyType::String => Ok(TypedValue::String(raw.to_string())),
            PropertyType::Int => raw
                .trim()
                .parse()
                .map(TypedValue::Int)
                .map_err(|e| invalid(format!("{:?} is not an integer: {}", raw, e))),
            PropertyType::Number => raw
                .trim()
                .parse()
                .map(TypedValue::Number)
                .map_err(|e| invalid(format!("{:?} is not a number: {}", raw, e))),
            PropertyType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(TypedValue::Boolean(true)),
                "false" => Ok(TypedValue::Boolean(false)),
                _ => Err(invalid(format!("{:?} is not a boolean", raw))),
            },
        }
    }

    /// Whether every key of `definition` (`name`, `type`, marketplace type) matches this property.
    pub fn matches_definition(&self, definition: &Value) -> bool {
        if let Some(name) = definition.get("name") {
            if name.as_str() != Some(self.name.as_str()) {
                return false;
            }
        }
        if let Some(type_name) = definition.get("type") {
            let declared = type_name.as_str().and_then(PropertyType::parse);
            if declared != Some(self.property_type) {
                return false;
            }
        }
        if let Some(marketplace) = definition.get(MARKETPLACE_KEY) {
            let xtype = marketplace.get("type").and_then(Value::as_str);
            if xtype != self.xtype.as_deref() {
                return false;
            }
        }
        true
    }

    fn from_raw(name: &str, raw: RawProperty) -> Result<Self> {
        let property_type = PropertyType::parse(&raw.property_type).ok_or_else(|| {
            DeployError::InvalidSchema(format!(
                "property {} has unsupported type {:?}",
                name, raw.property_type
            ))
        })?;

        let default = match raw.default {
            Some(value) => Some(typed_default(name, property_type, value)?),
            None => None,
        };

        let xtype = raw.marketplace.as_ref().map(|m| m.xtype.clone());
        let password = match raw.marketplace {
            Some(m) if m.xtype == XTYPE_GENERATED_PASSWORD => {
                let settings = m.generated_password.unwrap_or_default();
                let defaults = PasswordSettings::default();
                Some(PasswordSettings {
                    length: settings.length.unwrap_or(defaults.length),
                    include_symbols: settings.include_symbols.unwrap_or(defaults.include_symbols),
                    base64: settings.base64.unwrap_or(defaults.base64),
                })
            }
            _ => None,
        };

        Ok(Property {
            name: name.to_string(),
            property_type,
            default,
            xtype,
            password,
        })
    }
}

fn typed_default(name: &str, property_type: PropertyType, value: Value) -> Result<TypedValue> {
    let typed = match (property_type, &value) {
        (PropertyType::String, Value::String(s)) => Some(TypedValue::String(s.clone())),
        (PropertyType::Int, Value::Number(n)) => n.as_i64().map(TypedValue::Int),
        (PropertyType::Number, Value::Number(n)) => n.as_f64().map(TypedValue::Number),
        (PropertyType::Boolean, Value::Bool(b)) => Some(TypedValue::Boolean(*b)),
        _ => None,
    };

    typed.ok_or_else(|| {
        DeployError::InvalidSchema(format!(
            "default of property {} does not match type {:?}: {:?}",
            name, property_type, value
        ))
    })
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    properties: BTreeMap<String, RawProperty>,
    #[serde(default)]
    required: Vec<String>,
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    property_type: String,
    #[serde(default)]
    default: Option<Value>,
    #[serde(rename = "x-google-marketplace", default)]
    marketplace: Option<RawMarketplace>,
}

#[derive(Deserialize)]
struct RawMarketplace {
    #[serde(rename = "type")]
    xtype: String,
    #[serde(rename = "generatedPassword", default)]
    generated_password: Option<RawPassword>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawPassword {
    length: Option<usize>,
    include_symbols: Option<bool>,
    base64: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub properties: BTreeMap<String, Property>,
    pub required: Vec<String>,
}

impl Schema {
    pub fn load_yaml(content: &str) -> Result<Self> {
        let raw: RawSchema = serde_yaml::from_str(content)
            .map_err(|e| DeployError::InvalidSchema(format!("failed to parse schema: {}", e)))?;

        let properties = raw
            .properties
            .into_iter()
            .map(|(name, property)| Property::from_raw(&name, property).map(|p| (name, p)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Schema {
            properties,
            required: raw.required,
        })
    }

    pub async fn load_yaml_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DeployError::InvalidSchema(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::load_yaml(&content)
    }

    /// The single property tagged with the given marketplace type.
    pub fn property_by_xtype(&self, xtype: &str) -> Result<&Property> {
        let mut matches = self
            .properties
            .values()
            .filter(|p| p.xtype.as_deref() == Some(xtype));

        match (matches.next(), matches.next()) {
            (Some(property), None) => Ok(property),
            (None, _) => Err(DeployError::InvalidSchema(format!(
                "no property of type {}",
                xtype
            ))),
            (Some(_), Some(_)) => Err(DeployError::InvalidSchema(format!(
                "multiple properties of type {}",
                xtype
            ))),
        }
    }
}
