//! Field schemas and operator support tables for the command line.

use anyhow::{Context, Result};
use filter_expr::{FieldDef, FieldType, OperatorSupport};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use strum_macros::{Display, EnumString};

/// Built-in demo field lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Dataset {
    #[default]
    People,
    Products,
}

impl Dataset {
    pub fn fields(self) -> Vec<FieldDef> {
        match self {
            Dataset::People => vec![
                FieldDef::new("age", "Age", FieldType::Number),
                FieldDef::new("role", "Role", FieldType::String),
                FieldDef::new("isActive", "Active", FieldType::Boolean),
                FieldDef::new("joined", "Joined", FieldType::Date),
            ],
            Dataset::Products => vec![
                FieldDef::new("title", "Title", FieldType::String),
                FieldDef::new("price", "Price", FieldType::Number),
                FieldDef::new("inStock", "In Stock", FieldType::Boolean),
                FieldDef::new("released", "Released", FieldType::Date),
            ],
        }
    }
}

/// Fields plus operator support, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub fields: Vec<FieldDef>,
    pub support: OperatorSupport,
}

impl Schema {
    pub fn resolve(dataset: Dataset, fields_file: Option<&Path>, support_file: Option<&Path>) -> Result<Self> {
        let fields = match fields_file {
            Some(path) => load_fields(path)?,
            None => dataset.fields(),
        };
        let support = match support_file {
            Some(path) => load_support(path)?,
            None => OperatorSupport::default(),
        };
        log::debug!(
            "schema has {} fields, support loaded from {}",
            fields.len(),
            support_file.map_or("defaults".to_string(), |p| p.display().to_string())
        );
        Ok(Self { fields, support })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse a YAML or JSON file, picked by extension. Anything that is not `.yaml`/`.yml`
/// is read as JSON.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs_err::read_to_string(path)?;
    if is_yaml(path) {
        serde_yaml_ng::from_str(&text).with_context(|| format!("Failed to parse YAML {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON {}", path.display()))
    }
}

pub fn load_fields(path: &Path) -> Result<Vec<FieldDef>> {
    let fields: Vec<FieldDef> = load_document(path)?;
    if fields.is_empty() {
        anyhow::bail!("No fields defined in {}", path.display());
    }
    Ok(fields)
}

pub fn load_support(path: &Path) -> Result<OperatorSupport> {
    load_document(path)
}

/// Filter JSON from an inline argument, a file, or stdin, in that order.
pub fn read_filter_json(inline: Option<&str>, file: Option<&Path>) -> Result<serde_json::Value> {
    let text = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => fs_err::read_to_string(path)?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read filter from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Filter is not valid JSON")
}
