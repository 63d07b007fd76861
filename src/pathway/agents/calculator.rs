// SPDX-License-Identifier: MIT

//! Calculator playgrounds
//!
//! The single-step calculator writes its sentence to `result`. The conditional
//! calculator greets first, then routes on `operation` to one aggregation step
//! per operation, each appending its sentence to `message`.

use super::profile::SIGN_OFF;
use crate::adk::error::Result;
use crate::pathway::graph::{CompiledGraph, GraphBuilder, OperationRouter, Target};
use crate::pathway::state::{FieldDef, FieldType, Operation, State, StateSchema};
use crate::pathway::steps::fields::{MESSAGE, NAME, NUMBERS, OPERATION, RESULT};
use crate::pathway::steps::{AggregateStep, CalculateStep, GreetingStep, Output};
use serde_json::json;

/// Step name used for each operation in the conditional calculator
pub fn step_for(operation: Operation) -> &'static str {
    match operation {
        Operation::Add => "add",
        Operation::Subtract => "subtract",
        Operation::Multiply => "multiply",
        Operation::Divide => "divide",
    }
}

/// Single `process` step: `The subtraction of [1, 2, 3, 4] is -8`
pub fn calculator_graph() -> Result<CompiledGraph> {
    GraphBuilder::new("calculator")
        .add_step("process", CalculateStep)
        .set_entry_point("process")
        .add_edge("process", "END")
        .compile()
}

pub fn calculator_state(numbers: Vec<f64>, operation: Operation) -> Result<State> {
    let schema = StateSchema::new()
        .field(NUMBERS, FieldType::Numbers)
        .field(OPERATION, FieldType::Operation)
        .field_def(RESULT, FieldDef::new(FieldType::Text).with_default(json!("")));

    State::new(&schema)?
        .with(NUMBERS, numbers)?
        .with(OPERATION, operation)
}

/// `greet` → one of `add | subtract | multiply | divide` → END
pub fn conditional_calculator_graph() -> Result<CompiledGraph> {
    let mut builder = GraphBuilder::new("conditional_calculator")
        .add_step("greet", GreetingStep::with_sign_off(SIGN_OFF))
        .set_entry_point("greet")
        .add_conditional_edges(
            "greet",
            OperationRouter::new(OPERATION, |op| Target::from(step_for(op))),
        );

    for operation in Operation::ALL {
        let name = step_for(operation);
        builder = builder
            .add_step(name, AggregateStep::new(operation, Output::Message))
            .add_edge(name, "END");
    }

    builder.compile()
}

pub fn conditional_calculator_state(
    name: &str,
    numbers: Vec<f64>,
    operation: Operation,
) -> Result<State> {
    let schema = StateSchema::new()
        .field_def(NAME, FieldDef::new(FieldType::Text).with_default(json!("")))
        .field_def(MESSAGE, FieldDef::new(FieldType::Text).with_default(json!("")))
        .field(NUMBERS, FieldType::Numbers)
        .field(OPERATION, FieldType::Operation);

    State::new(&schema)?
        .with(NAME, name)?
        .with(NUMBERS, numbers)?
        .with(OPERATION, operation)
}
