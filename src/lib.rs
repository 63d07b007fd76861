// SPDX-License-Identifier: MIT

//! pathway-rs - small state-graph executor for agent pipelines
//!
//! - [adk] holds the primitives: errors, the model-call collaborator and tools
//! - [pathway] holds the state container, steps, routers, the graph executor,
//!   prebuilt playground graphs and YAML workflow loading

pub mod adk;
pub mod pathway;
