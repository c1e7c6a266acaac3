//! Accelerator configuration document
//!
//! The document is kept as an order-preserving `serde_json` tree: the
//! conversion only touches the fields it knows about and every other key is
//! written back exactly where it was read.

use crate::error::{MigrationError, Result};
use serde_json::{Map, Value};
use std::fmt;

pub const HOME_REGION_PLACEHOLDER: &str = "${HOME_REGION}";
pub const OU_NAME_PLACEHOLDER: &str = "${CONFIG::OU_NAME}";

/// Top-level sections of the configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    GlobalOptions,
    OrganizationalUnits,
    MandatoryAccounts,
    WorkloadAccounts,
}

impl Section {
    /// Sections holding VPCs, in the order CIDR passes visit them
    pub const VPC_SECTIONS: [Section; 3] = [
        Section::OrganizationalUnits,
        Section::MandatoryAccounts,
        Section::WorkloadAccounts,
    ];

    /// Sections holding account entries
    pub const ACCOUNT_SECTIONS: [Section; 2] =
        [Section::MandatoryAccounts, Section::WorkloadAccounts];

    pub fn key(&self) -> &'static str {
        match self {
            Section::GlobalOptions => "global-options",
            Section::OrganizationalUnits => "organizational-units",
            Section::MandatoryAccounts => "mandatory-account-configs",
            Section::WorkloadAccounts => "workload-account-configs",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Partition key of both assignment tables
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountOuKey {
    Account(String),
    OrganizationalUnit(String),
}

impl fmt::Display for AccountOuKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountOuKey::Account(key) => write!(f, "account/{}", key),
            AccountOuKey::OrganizationalUnit(key) => write!(f, "organizational-unit/{}", key),
        }
    }
}

/// A parsed accelerator configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(MigrationError::invalid_document(format!(
                "expected a JSON object at the top level, found {}",
                type_name(&other)
            ))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| MigrationError::invalid_document(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Two-space indented JSON
    pub fn to_pretty_json(&self) -> String {
        // Serializing a Map of Values cannot fail
        serde_json::to_string_pretty(&self.root).unwrap_or_default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Entries of a section; an absent section reads as empty.
    pub fn section(&self, section: Section) -> Result<Option<&Map<String, Value>>> {
        match self.root.get(section.key()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(section_shape_error(section, other)),
        }
    }

    pub fn section_mut(&mut self, section: Section) -> Result<Option<&mut Map<String, Value>>> {
        match self.root.get_mut(section.key()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(section_shape_error(section, other)),
        }
    }
}

fn section_shape_error(section: Section, found: &Value) -> MigrationError {
    MigrationError::invalid_document(format!(
        "section '{}' must be an object, found {}",
        section,
        type_name(found)
    ))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Python-style truthiness, used when stripping optional keys
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Rename `from` to `to` keeping the entry at its original position.
///
/// Returns false, leaving the map untouched, when `from` is absent or `to`
/// is already taken.
pub(crate) fn rename_key(map: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if from == to || !map.contains_key(from) || map.contains_key(to) {
        return false;
    }
    let entries = std::mem::take(map);
    for (key, value) in entries {
        if key == from {
            map.insert(to.to_string(), value);
        } else {
            map.insert(key, value);
        }
    }
    true
}

/// Required string field of a JSON object
pub(crate) fn required_str<'a>(
    entry: &'a Map<String, Value>,
    field: &str,
    location: &str,
) -> Result<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MigrationError::missing_field(field, location))
}

/// Array of objects under `field`; absent or null reads as empty
pub(crate) fn object_list<'a>(
    entry: &'a Map<String, Value>,
    field: &str,
    location: &str,
) -> Result<Vec<&'a Map<String, Value>>> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object().ok_or_else(|| {
                    MigrationError::invalid_document(format!(
                        "{}: '{}' entries must be objects, found {}",
                        location,
                        field,
                        type_name(item)
                    ))
                })
            })
            .collect(),
        Some(other) => Err(MigrationError::invalid_document(format!(
            "{}: '{}' must be an array, found {}",
            location,
            field,
            type_name(other)
        ))),
    }
}

/// Mutable twin of [`object_list`]
pub(crate) fn object_list_mut<'a>(
    entry: &'a mut Map<String, Value>,
    field: &str,
    location: &str,
) -> Result<Vec<&'a mut Map<String, Value>>> {
    match entry.get_mut(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter_mut()
            .map(|item| {
                let kind = type_name(item);
                item.as_object_mut().ok_or_else(|| {
                    MigrationError::invalid_document(format!(
                        "{}: '{}' entries must be objects, found {}",
                        location, field, kind
                    ))
                })
            })
            .collect(),
        Some(other) => Err(MigrationError::invalid_document(format!(
            "{}: '{}' must be an array, found {}",
            location,
            field,
            type_name(other)
        ))),
    }
}
