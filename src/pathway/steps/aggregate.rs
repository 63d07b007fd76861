// SPDX-License-Identifier: MIT

//! Arithmetic over the `numbers` field

use super::fields::{MESSAGE, NUMBERS, OPERATION, RESULT};
use crate::adk::error::Result;
use crate::pathway::graph::Step;
use crate::pathway::state::{format_numbers, Operation, StateUpdate, StateView};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where an aggregation reports its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// Append ` The sum of [..] is n.` to `message`
    #[default]
    Message,
    /// Write `The sum of [..] is n` to `result`
    Result,
}

/// `The subtraction of [1, 2, 3, 4] is -8`
fn describe(operation: Operation, numbers: &[f64]) -> Result<String> {
    let value = operation.aggregate(numbers)?;
    Ok(format!(
        "The {} of {} is {}",
        operation.noun(),
        format_numbers(numbers),
        value
    ))
}

/// Reduces `numbers` with a fixed operation
#[derive(Debug, Clone, Copy)]
pub struct AggregateStep {
    operation: Operation,
    output: Output,
}

impl AggregateStep {
    pub fn new(operation: Operation, output: Output) -> Self {
        Self { operation, output }
    }
}

#[async_trait]
impl Step for AggregateStep {
    fn reads(&self) -> Vec<&str> {
        match self.output {
            Output::Message => vec![NUMBERS, MESSAGE],
            Output::Result => vec![NUMBERS],
        }
    }

    fn writes(&self) -> Vec<&str> {
        match self.output {
            Output::Message => vec![MESSAGE],
            Output::Result => vec![RESULT],
        }
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let sentence = describe(self.operation, view.numbers(NUMBERS)?)?;
        log::debug!("{}", sentence);

        Ok(match self.output {
            Output::Message => {
                let message = format!("{} {}.", view.text(MESSAGE)?, sentence);
                StateUpdate::new().set(MESSAGE, message)
            }
            Output::Result => StateUpdate::new().set(RESULT, sentence),
        })
    }
}

/// Single-step calculator: the operation comes from the `operation` field
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculateStep;

#[async_trait]
impl Step for CalculateStep {
    fn reads(&self) -> Vec<&str> {
        vec![NUMBERS, OPERATION]
    }

    fn writes(&self) -> Vec<&str> {
        vec![RESULT]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let operation = view.operation(OPERATION)?;
        let sentence = describe(operation, view.numbers(NUMBERS)?)?;
        Ok(StateUpdate::new().set(RESULT, sentence))
    }
}
