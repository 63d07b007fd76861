// SPDX-License-Identifier: MIT

use crate::adk::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools the model can ask to invoke.
///
/// `name()` and `description()` return `&str` and `schema()` returns `&Value`
/// so implementations keep them in fields or statics instead of rebuilding
/// them for every request.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within a registry)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input and return the result
    async fn execute(&self, input: Value) -> Result<Value>;
}
