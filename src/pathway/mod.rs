// SPDX-License-Identifier: MIT

pub mod agents;
pub mod condition;
pub mod graph;
pub mod state;
pub mod steps;
pub mod tools;
pub mod workflow;
