// SPDX-License-Identifier: MIT

//! Runtime state storage for graph execution

use std::collections::HashMap;

use super::operation::Operation;
use super::schema::{FieldDef, Reducer, StateSchema};
use super::value::{FieldType, Value};
use crate::adk::error::{PathwayError, Result};
use crate::adk::model::Message;

/// Runtime graph state with reducer support
#[derive(Debug, Clone)]
pub struct State {
    /// Current state values
    values: HashMap<String, Value>,
    /// Type and reducer for each field
    fields: HashMap<String, FieldDef>,
}

impl State {
    /// Create a State from a schema, seeding declared defaults
    pub fn new(schema: &StateSchema) -> Result<Self> {
        let mut values = HashMap::new();

        for (name, def) in &schema.fields {
            if def.reducer == Reducer::Append && !appendable(def.field_type) {
                return Err(PathwayError::config(format!(
                    "field '{}': a {} cannot use the append reducer",
                    name,
                    def.field_type.name()
                )));
            }
            if let Some(default) = &def.default {
                values.insert(name.clone(), def.field_type.from_json(name, default)?);
            }
        }

        Ok(Self {
            values,
            fields: schema.fields.clone(),
        })
    }

    /// Set a field, replacing any current value
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.check_type(key, &value)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Builder form of [`State::set`]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Merge an update through each field's reducer
    pub fn apply(&mut self, update: StateUpdate) -> Result<()> {
        for (key, value) in update.entries {
            self.check_type(&key, &value)?;
            let reducer = self
                .fields
                .get(&key)
                .map(|def| def.reducer)
                .unwrap_or_default();

            match (reducer, self.values.get_mut(&key)) {
                (Reducer::Append, Some(current)) => append(current, value),
                _ => {
                    self.values.insert(key, value);
                }
            }
        }
        Ok(())
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Declared type of a field
    pub fn field_type(&self, key: &str) -> Option<FieldType> {
        self.fields.get(key).map(|def| def.field_type)
    }

    /// Names of the fields currently holding a value
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Read-only view restricted to `reads`, on behalf of `owner`
    pub fn view<'a>(&'a self, owner: &'a str, reads: &'a [String]) -> StateView<'a> {
        StateView {
            state: self,
            owner,
            reads,
        }
    }

    fn check_type(&self, key: &str, value: &Value) -> Result<()> {
        let def = self
            .fields
            .get(key)
            .ok_or_else(|| PathwayError::undeclared("state schema", key))?;
        if def.field_type != value.field_type() {
            return Err(PathwayError::field_type(key, def.field_type.name()));
        }
        Ok(())
    }
}

fn appendable(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::Text | FieldType::Numbers | FieldType::Texts | FieldType::Messages
    )
}

/// Types already match; anything else overwrites
fn append(current: &mut Value, value: Value) {
    match (current, value) {
        (Value::Text(cur), Value::Text(new)) => cur.push_str(&new),
        (Value::Numbers(cur), Value::Numbers(new)) => cur.extend(new),
        (Value::Texts(cur), Value::Texts(new)) => cur.extend(new),
        (Value::Messages(cur), Value::Messages(new)) => cur.extend(new),
        (cur, new) => *cur = new,
    }
}

/// The part of a [`State`] a step or router declared it reads
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    state: &'a State,
    owner: &'a str,
    reads: &'a [String],
}

impl<'a> StateView<'a> {
    /// Name of the step or router holding this view
    pub fn owner(&self) -> &str {
        self.owner
    }

    pub fn get(&self, key: &str) -> Result<&'a Value> {
        if !self.reads.iter().any(|r| r == key) {
            return Err(PathwayError::undeclared(self.owner, key));
        }
        self.state
            .get(key)
            .ok_or_else(|| PathwayError::MissingField(key.to_string()))
    }

    pub fn text(&self, key: &str) -> Result<&'a str> {
        match self.get(key)? {
            Value::Text(s) => Ok(s),
            _ => Err(PathwayError::field_type(key, FieldType::Text.name())),
        }
    }

    pub fn number(&self, key: &str) -> Result<f64> {
        match self.get(key)? {
            Value::Number(n) => Ok(*n),
            _ => Err(PathwayError::field_type(key, FieldType::Number.name())),
        }
    }

    pub fn numbers(&self, key: &str) -> Result<&'a [f64]> {
        match self.get(key)? {
            Value::Numbers(v) => Ok(v),
            _ => Err(PathwayError::field_type(key, FieldType::Numbers.name())),
        }
    }

    pub fn texts(&self, key: &str) -> Result<&'a [String]> {
        match self.get(key)? {
            Value::Texts(v) => Ok(v),
            _ => Err(PathwayError::field_type(key, FieldType::Texts.name())),
        }
    }

    /// An operation, or a symbol held as text (parsed, so `%` is `UnknownOperation`)
    pub fn operation(&self, key: &str) -> Result<Operation> {
        match self.get(key)? {
            Value::Operation(op) => Ok(*op),
            Value::Text(symbol) => symbol.parse(),
            _ => Err(PathwayError::field_type(key, FieldType::Operation.name())),
        }
    }

    pub fn messages(&self, key: &str) -> Result<&'a [Message]> {
        match self.get(key)? {
            Value::Messages(m) => Ok(m),
            _ => Err(PathwayError::field_type(key, FieldType::Messages.name())),
        }
    }
}

/// Explicit patch returned by a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    entries: Vec<(String, Value)>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries.push((key.to_string(), value.into()));
        self
    }

    /// Fields written by this update, in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
