// SPDX-License-Identifier: MIT

//! The closed set of arithmetic operations a calculator state can carry

use crate::adk::error::{PathwayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arithmetic operation discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    /// Noun used when describing a result ("The sum of ...")
    pub fn noun(&self) -> &'static str {
        match self {
            Operation::Add => "sum",
            Operation::Subtract => "subtraction",
            Operation::Multiply => "multiplication",
            Operation::Divide => "division",
        }
    }

    /// Apply to a single pair of operands
    pub fn apply(&self, a: f64, b: f64) -> Result<f64> {
        match self {
            Operation::Add => Ok(a + b),
            Operation::Subtract => Ok(a - b),
            Operation::Multiply => Ok(a * b),
            Operation::Divide => {
                if b == 0.0 {
                    Err(PathwayError::DivisionByZero { position: 1 })
                } else {
                    Ok(a / b)
                }
            }
        }
    }

    /// Reduce a sequence strictly left to right.
    ///
    /// Sum and product of an empty sequence are 0 and 1; subtraction and
    /// division need the first element as seed.
    pub fn aggregate(&self, numbers: &[f64]) -> Result<f64> {
        match self {
            Operation::Add => Ok(numbers.iter().sum()),
            Operation::Multiply => Ok(numbers.iter().product()),
            Operation::Subtract | Operation::Divide => {
                let (seed, rest) = numbers
                    .split_first()
                    .ok_or_else(|| PathwayError::EmptyOperands {
                        operation: self.noun().to_string(),
                    })?;

                rest.iter()
                    .enumerate()
                    .try_fold(*seed, |acc, (i, n)| {
                        self.apply(acc, *n).map_err(|e| match e {
                            PathwayError::DivisionByZero { .. } => {
                                PathwayError::DivisionByZero { position: i + 1 }
                            }
                            other => other,
                        })
                    })
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operation {
    type Err = PathwayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "+" => Ok(Operation::Add),
            "-" => Ok(Operation::Subtract),
            "*" => Ok(Operation::Multiply),
            "/" => Ok(Operation::Divide),
            other => Err(PathwayError::UnknownOperation(other.to_string())),
        }
    }
}
