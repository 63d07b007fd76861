// SPDX-License-Identifier: MIT

//! Typed values held in a graph state

use super::operation::Operation;
use crate::adk::error::{PathwayError, Result};
use crate::adk::model::{Message, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single state value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(f64),
    Numbers(Vec<f64>),
    Texts(Vec<String>),
    Operation(Operation),
    Messages(Vec<Message>),
}

/// Supported field types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Numbers,
    Texts,
    Operation,
    Messages,
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Text(_) => FieldType::Text,
            Value::Number(_) => FieldType::Number,
            Value::Numbers(_) => FieldType::Numbers,
            Value::Texts(_) => FieldType::Texts,
            Value::Operation(_) => FieldType::Operation,
            Value::Messages(_) => FieldType::Messages,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_messages(&self) -> Option<&[Message]> {
        match self {
            Value::Messages(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Numbers(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Texts(v)
    }
}

impl From<Operation> for Value {
    fn from(op: Operation) -> Self {
        Value::Operation(op)
    }
}

impl From<Vec<Message>> for Value {
    fn from(m: Vec<Message>) -> Self {
        Value::Messages(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Numbers(v) => f.write_str(&format_numbers(v)),
            Value::Texts(v) => f.write_str(&v.join(", ")),
            Value::Operation(op) => write!(f, "{}", op),
            // Conversations render as their latest message
            Value::Messages(m) => match m.last() {
                Some(last) => write!(f, "{}: {}", last.role, last.text()),
                None => Ok(()),
            },
        }
    }
}

/// Render numbers as `[1, 2, 3.5]`
pub fn format_numbers(numbers: &[f64]) -> String {
    let items: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
    format!("[{}]", items.join(", "))
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Numbers => "list of numbers",
            FieldType::Texts => "list of texts",
            FieldType::Operation => "operation",
            FieldType::Messages => "list of messages",
        }
    }

    /// Parse a command-line value (`1,2,3`, `Python,AWS`, `-`)
    pub fn parse(&self, field: &str, raw: &str) -> Result<Value> {
        let number = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| PathwayError::field_type(field, self.name()))
        };

        match self {
            FieldType::Text => Ok(Value::Text(raw.to_string())),
            FieldType::Number => Ok(Value::Number(number(raw)?)),
            FieldType::Numbers => Ok(Value::Numbers(
                split_list(raw)
                    .map(number)
                    .collect::<Result<Vec<_>>>()?,
            )),
            FieldType::Texts => Ok(Value::Texts(split_list(raw).map(str::to_string).collect())),
            FieldType::Operation => Ok(Value::Operation(raw.parse()?)),
            FieldType::Messages => Ok(Value::Messages(vec![Message::human(raw)])),
        }
    }

    /// Convert a JSON/YAML value (workflow defaults and inputs)
    pub fn from_json(&self, field: &str, json: &serde_json::Value) -> Result<Value> {
        let mismatch = || PathwayError::field_type(field, self.name());

        match self {
            FieldType::Text => json.as_str().map(Value::from).ok_or_else(mismatch),
            FieldType::Number => json.as_f64().map(Value::Number).ok_or_else(mismatch),
            FieldType::Numbers => json
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|v| v.as_f64().ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()
                .map(Value::Numbers),
            FieldType::Texts => json
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()
                .map(Value::Texts),
            FieldType::Operation => {
                let symbol = json.as_str().ok_or_else(mismatch)?;
                Ok(Value::Operation(symbol.parse()?))
            }
            FieldType::Messages => json
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|v| message_from_json(v).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()
                .map(Value::Messages),
        }
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// `"hi"` is a human message; `{role: system, content: "..."}` picks the role
fn message_from_json(json: &serde_json::Value) -> Option<Message> {
    if let Some(text) = json.as_str() {
        return Some(Message::human(text));
    }
    let content = json.get("content")?.as_str()?;
    let role = match json.get("role").and_then(|r| r.as_str()).unwrap_or("human") {
        "system" => Role::System,
        "human" | "user" => Role::Human,
        "assistant" => Role::Assistant,
        _ => return None,
    };
    Some(Message::new(role, content))
}
