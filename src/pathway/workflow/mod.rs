// SPDX-License-Identifier: MIT

//! YAML-defined graphs built from the step catalogue

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::{Workflow, WorkflowBuilder};
pub use loader::WorkflowLoader;
pub use types::{BranchDefinition, EdgeDefinition, NodeDefinition, StepKind, WorkflowDefinition};
