// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for condition expressions

use std::fmt;

/// A condition expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Comparison expression: field op literal
    Compare {
        field: String,
        op: CompareOp,
        right: Literal,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    True,
    False,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring, list membership
    Contains,
}

/// Literal values in expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
    /// Matches an absent field
    Null,
}

impl Expression {
    /// State fields the expression reads, in first-use order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Compare { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Expression::And(l, r) | Expression::Or(l, r) => {
                l.collect_fields(out);
                r.collect_fields(out);
            }
            Expression::Not(inner) => inner.collect_fields(out),
            Expression::True | Expression::False => {}
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Contains => write!(f, "contains"),
        }
    }
}
