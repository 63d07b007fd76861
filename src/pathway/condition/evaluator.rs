// SPDX-License-Identifier: MIT

//! Condition expression evaluator

use super::ast::{CompareOp, Expression, Literal};
use crate::adk::error::{PathwayError, Result};
use crate::pathway::state::{StateView, Value};

/// Evaluate a condition expression against the fields a router may read.
///
/// A field the view does not expose is an error; an absent field only
/// matches `null`.
pub fn evaluate(expr: &Expression, view: &StateView<'_>) -> Result<bool> {
    Ok(match expr {
        Expression::True => true,
        Expression::False => false,
        Expression::Compare { field, op, right } => {
            let value = match view.get(field) {
                Ok(value) => Some(value),
                Err(PathwayError::MissingField(_)) => None,
                Err(e) => return Err(e),
            };
            compare(value, *op, right)
        }
        Expression::And(left, right) => evaluate(left, view)? && evaluate(right, view)?,
        Expression::Or(left, right) => evaluate(left, view)? || evaluate(right, view)?,
        Expression::Not(inner) => !evaluate(inner, view)?,
    })
}

fn compare(left: Option<&Value>, op: CompareOp, right: &Literal) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Gt => compare_numbers(left, right, |a, b| a > b),
        CompareOp::Gte => compare_numbers(left, right, |a, b| a >= b),
        CompareOp::Lt => compare_numbers(left, right, |a, b| a < b),
        CompareOp::Lte => compare_numbers(left, right, |a, b| a <= b),
        CompareOp::Contains => contains(left, right),
    }
}

fn values_equal(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (None, Literal::Null) => true,
        (Some(Value::Text(s)), Literal::Text(rs)) => s == rs,
        (Some(Value::Operation(op)), Literal::Text(rs)) => op.symbol() == rs,
        (Some(Value::Number(n)), Literal::Number(rn)) => (n - rn).abs() < f64::EPSILON,
        _ => false,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: &Literal, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (left, right) {
        (Some(Value::Number(n)), Literal::Number(rn)) => cmp(*n, *rn),
        _ => false,
    }
}

fn contains(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (Some(Value::Text(s)), Literal::Text(sub)) => s.contains(sub.as_str()),
        (Some(Value::Texts(items)), Literal::Text(item)) => items.iter().any(|s| s == item),
        (Some(Value::Numbers(items)), Literal::Number(n)) => {
            items.iter().any(|x| (x - n).abs() < f64::EPSILON)
        }
        _ => false,
    }
}
