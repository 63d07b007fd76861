// SPDX-License-Identifier: MIT

//! Condition evaluation for routed edges
//!
//! This module provides parsing and evaluation of `when` conditions.
//! Conditions are simple expressions like:
//! - `operation == '+'`
//! - `age < 18`
//! - `name != '' and skills contains 'AWS'`
//! - `not (age >= 18 or name == 'admin')`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal};
pub use evaluator::evaluate;
pub use parser::parse;
