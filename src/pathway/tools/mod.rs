// SPDX-License-Identifier: MIT

//! Tools the model-call step can bind and the tool step can invoke

mod arithmetic;
mod registry;

pub use arithmetic::{all_arithmetic_tools, calculator_tools, ArithmeticTool, OperandArgs};
pub use registry::ToolRegistry;
