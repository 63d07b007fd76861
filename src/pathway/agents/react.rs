// SPDX-License-Identifier: MIT

//! ReAct calculator: the model calls arithmetic tools until it can answer

use crate::adk::error::Result;
use crate::adk::model::{GenerationConfig, Model};
use crate::pathway::graph::{CompiledGraph, GraphBuilder, ToolCallRouter, DEFAULT_MAX_ITERATIONS};
use crate::pathway::steps::fields::MESSAGES;
use crate::pathway::steps::{ModelCallStep, ToolStep};
use crate::pathway::tools::ToolRegistry;
use std::sync::Arc;

/// Model the calculator REPL targets on GitHub Models
pub const REACT_MODEL: &str = "openai/gpt-4o-mini";

pub const REACT_SYSTEM_PROMPT: &str = "You are a calculator that can perform basic arithmetic \
operations like addition and subtraction. You can add and subtract two numbers provided by the user.";

/// `model_call` ⇄ `tools`, ending once the model replies without tool calls.
///
/// Every tool in `registry` at build time is advertised to the model.
pub async fn react_graph(
    model: Arc<dyn Model>,
    registry: &ToolRegistry,
    config: GenerationConfig,
) -> Result<CompiledGraph> {
    let tools = registry.list().await;
    log::debug!("ReAct graph bound to {} tools", tools.len());

    GraphBuilder::new("react")
        .add_step(
            "model_call",
            ModelCallStep::new(model).with_tools(tools).with_config(config),
        )
        .add_step("tools", ToolStep::new(registry.clone()))
        .set_entry_point("model_call")
        .add_conditional_edges("model_call", ToolCallRouter::new(MESSAGES, "tools"))
        .add_edge("tools", "model_call")
        .max_iterations(DEFAULT_MAX_ITERATIONS)
        .compile()
}
