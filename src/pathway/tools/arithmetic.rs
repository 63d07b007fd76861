// SPDX-License-Identifier: MIT

use crate::adk::error::{PathwayError, Result};
use crate::adk::tool::Tool;
use crate::pathway::state::Operation;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Arguments shared by every two-operand tool
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OperandArgs {
    /// First operand
    pub a: f64,
    /// Second operand
    pub b: f64,
}

static OPERAND_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let mut schema = serde_json::to_value(schema_for!(OperandArgs))
        .unwrap_or_else(|_| json!({"type": "object"}));
    // Function parameters are a bare object schema
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
        map.remove("title");
    }
    schema
});

/// One arithmetic operation exposed as a tool (`add`, `subtract`, ...)
pub struct ArithmeticTool {
    operation: Operation,
    name: String,
    description: String,
}

impl ArithmeticTool {
    pub fn new(operation: Operation) -> Self {
        let (name, description) = match operation {
            Operation::Add => ("add", "Adds two numbers together."),
            Operation::Subtract => ("subtract", "Subtracts the second number from the first."),
            Operation::Multiply => ("multiply", "Multiplies two numbers together."),
            Operation::Divide => ("divide", "Divides the first number by the second."),
        };
        Self {
            operation,
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &Value {
        &OPERAND_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: OperandArgs =
            serde_json::from_value(input).map_err(|e| PathwayError::ToolArguments {
                tool: self.name.clone(),
                message: e.to_string(),
            })?;

        let result = self.operation.apply(args.a, args.b)?;
        log::debug!(
            "{}({}, {}) = {}",
            self.name,
            args.a,
            args.b,
            result
        );
        Ok(json!({ "result": result }))
    }
}

/// The add/subtract pair bound by the ReAct calculator
pub fn calculator_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ArithmeticTool::new(Operation::Add)),
        Arc::new(ArithmeticTool::new(Operation::Subtract)),
    ]
}

pub fn all_arithmetic_tools() -> Vec<Arc<dyn Tool>> {
    Operation::ALL
        .into_iter()
        .map(|op| Arc::new(ArithmeticTool::new(op)) as Arc<dyn Tool>)
        .collect()
}
