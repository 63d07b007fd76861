// SPDX-License-Identifier: MIT

//! Condition expression parser
//!
//! `or` binds loosest, then `and`, then a `not` prefix; parentheses group.

use super::ast::{CompareOp, Expression, Literal};
use crate::adk::error::{PathwayError, Result};

// Longest first, so `>=` is not read as `>`
const OPERATORS: [(&str, CompareOp); 7] = [
    ("!=", CompareOp::NotEq),
    (">=", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    ("==", CompareOp::Eq),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
    (" contains ", CompareOp::Contains),
];

/// Parse a condition expression string into an AST
pub fn parse(input: &str) -> Result<Expression> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PathwayError::invalid_graph("empty condition"));
    }

    if let Some(pos) = find_top_level(input, " or ") {
        return Ok(Expression::Or(
            Box::new(parse(&input[..pos])?),
            Box::new(parse(&input[pos + 4..])?),
        ));
    }
    if let Some(pos) = find_top_level(input, " and ") {
        return Ok(Expression::And(
            Box::new(parse(&input[..pos])?),
            Box::new(parse(&input[pos + 5..])?),
        ));
    }
    if let Some(rest) = input.strip_prefix("not ") {
        return Ok(Expression::Not(Box::new(parse(rest)?)));
    }
    if let Some(inner) = strip_parens(input) {
        return parse(inner);
    }

    match input {
        "true" => Ok(Expression::True),
        "false" => Ok(Expression::False),
        _ => parse_comparison(input),
    }
}

fn parse_comparison(input: &str) -> Result<Expression> {
    for (symbol, op) in OPERATORS {
        if let Some(pos) = find_top_level(input, symbol) {
            let field = input[..pos].trim();
            if !is_field_name(field) {
                break;
            }
            let right = parse_literal(input[pos + symbol.len()..].trim())?;
            return Ok(Expression::Compare {
                field: field.to_string(),
                op,
                right,
            });
        }
    }

    Err(PathwayError::invalid_graph(format!(
        "Could not parse condition: {}",
        input
    )))
}

fn parse_literal(input: &str) -> Result<Literal> {
    if input == "null" {
        return Ok(Literal::Null);
    }

    let quoted = input.len() >= 2
        && ((input.starts_with('\'') && input.ends_with('\''))
            || (input.starts_with('"') && input.ends_with('"')));
    if quoted {
        return Ok(Literal::Text(input[1..input.len() - 1].to_string()));
    }

    input.parse::<f64>().map(Literal::Number).map_err(|_| {
        PathwayError::invalid_graph(format!("Could not parse literal: {}", input))
    })
}

fn is_field_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Byte offset of `pattern` outside quotes and parentheses
fn find_top_level(input: &str, pattern: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && input[i..].starts_with(pattern) => return Some(i),
            _ => {}
        }
    }
    None
}

/// `(a and b)` -> `a and b`, but `(a) or (b)` is left alone
fn strip_parens(input: &str) -> Option<&str> {
    let inner = input.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(inner)
}
