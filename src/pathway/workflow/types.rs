// SPDX-License-Identifier: MIT

//! YAML schema types for workflow definitions

use crate::pathway::state::{Operation, StateSchema};
use crate::pathway::steps::Output;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level workflow definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Id of the first node to run
    pub entry: String,
    /// Step budget; the executor default applies when absent
    #[serde(default)]
    pub max_iterations: Option<u32>,
    /// Field reported once the run finishes
    pub output: String,
    /// Fields the workflow state may hold
    #[serde(default)]
    pub state: StateSchema,
    /// Initial values, checked against `state`
    #[serde(default)]
    pub input: HashMap<String, serde_json::Value>,
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// A node: an id plus one built-in step kind and its parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeDefinition {
    pub id: String,
    #[serde(flatten)]
    pub step: StepKind,
}

/// Built-in step catalogue, selected by the `step` key
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepKind {
    Greeting {
        #[serde(default)]
        sign_off: Option<String>,
    },
    AgeCheck,
    Skills,
    Aggregate {
        operation: Operation,
        #[serde(default)]
        output: Output,
    },
    Calculate,
    ModelCall {
        #[serde(default)]
        system: Option<String>,
    },
    Tools,
}

/// Outgoing edge of one node: exactly one of `to`, `branches` or `tool_calls`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EdgeDefinition {
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub branches: Vec<BranchDefinition>,
    /// Taken while the latest message in `messages` carries function calls
    #[serde(default)]
    pub tool_calls: Option<String>,
    /// Taken when no branch matches, or once there are no function calls
    #[serde(default)]
    pub otherwise: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchDefinition {
    pub when: String,
    pub to: String,
}
