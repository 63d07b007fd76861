// SPDX-License-Identifier: MIT

//! State schema definitions

use super::value::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema defining the fields a graph state may hold
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StateSchema {
    /// Field definitions
    #[serde(flatten)]
    pub fields: HashMap<String, FieldDef>,
}

/// Definition of a single state field
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldDef {
    /// Type of the field
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Reducer for merging updates
    #[serde(default)]
    pub reducer: Reducer,
    /// Default value
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// How an update is merged into the current value
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Replace the value (default)
    #[default]
    Overwrite,
    /// Concatenate onto the current sequence or text
    Append,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            reducer: Reducer::Overwrite,
            default: None,
        }
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

impl StateSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overwrite field with no default
    pub fn field(self, name: &str, field_type: FieldType) -> Self {
        self.field_def(name, FieldDef::new(field_type))
    }

    pub fn field_def(mut self, name: &str, def: FieldDef) -> Self {
        self.fields.insert(name.to_string(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }
}
