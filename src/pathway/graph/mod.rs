// SPDX-License-Identifier: MIT

//! Graph execution
//!
//! A graph is a fixed set of named steps, one entry point and at most one
//! outgoing edge per step. Edges are direct or routed; a step without an
//! outgoing edge ends the run. [`GraphBuilder::compile`] validates the
//! structure, and [`CompiledGraph`] runs it under a tick budget.

mod builder;
mod edge;
mod event;
mod executor;
mod router;
mod step;

pub use builder::{GraphBuilder, DEFAULT_MAX_ITERATIONS};
pub use edge::{Edge, Target, END};
pub use event::GraphEvent;
pub use executor::CompiledGraph;
pub use router::{ConditionRouter, OperationRouter, PredicateRouter, Router, ToolCallRouter};
pub use step::{FnStep, Step};
