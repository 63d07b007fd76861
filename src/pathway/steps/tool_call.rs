// SPDX-License-Identifier: MIT

use super::fields::MESSAGES;
use crate::adk::error::Result;
use crate::adk::model::{Message, Part, Role};
use crate::pathway::graph::Step;
use crate::pathway::state::{StateUpdate, StateView};
use crate::pathway::tools::ToolRegistry;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Executes the function calls of the latest assistant message.
///
/// Appends one tool message per call, carrying the call id. Unknown or
/// failing tools produce an `{"error": ...}` result for the model to read.
pub struct ToolStep {
    registry: ToolRegistry,
}

impl ToolStep {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    async fn invoke(&self, name: &str, args: &Value) -> Value {
        let Some(tool) = self.registry.get(name).await else {
            log::warn!("Model requested unknown tool '{}'", name);
            return json!({ "error": format!("Unknown tool '{}'", name) });
        };

        log::info!("Calling tool: {}", name);
        match tool.execute(args.clone()).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Tool '{}' failed: {}", name, e);
                json!({ "error": e.to_string() })
            }
        }
    }
}

#[async_trait]
impl Step for ToolStep {
    fn reads(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    fn writes(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    fn appends(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let Some(latest) = view
            .messages(MESSAGES)?
            .last()
            .filter(|m| m.role == Role::Assistant)
        else {
            log::warn!("No assistant message with tool calls to execute");
            return Ok(StateUpdate::new());
        };

        let mut results = Vec::new();
        for (id, name, args) in latest.function_calls() {
            let response = self.invoke(name, args).await;
            results.push(Message {
                role: Role::Tool,
                parts: vec![Part::FunctionResponse {
                    id: id.to_string(),
                    name: name.to_string(),
                    response,
                }],
            });
        }

        Ok(StateUpdate::new().set(MESSAGES, results))
    }
}
