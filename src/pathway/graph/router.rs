// SPDX-License-Identifier: MIT

//! Routers select the next step from the current state

use super::edge::Target;
use crate::adk::error::{PathwayError, Result};
use crate::pathway::condition::{self, Expression};
use crate::pathway::state::{Operation, StateView};

/// Conditional edge logic
pub trait Router: Send + Sync {
    /// Fields the router reads
    fn reads(&self) -> Vec<&str>;

    /// Every target the router may return
    fn targets(&self) -> Vec<Target>;

    fn route(&self, view: &StateView<'_>) -> Result<Target>;
}

/// Routes on an operation field, one target per operation
pub struct OperationRouter {
    field: String,
    add: Target,
    subtract: Target,
    multiply: Target,
    divide: Target,
}

impl OperationRouter {
    /// `route` is called once per operation to fix the table
    pub fn new(field: &str, route: impl Fn(Operation) -> Target) -> Self {
        Self {
            field: field.to_string(),
            add: route(Operation::Add),
            subtract: route(Operation::Subtract),
            multiply: route(Operation::Multiply),
            divide: route(Operation::Divide),
        }
    }
}

impl Router for OperationRouter {
    fn reads(&self) -> Vec<&str> {
        vec![self.field.as_str()]
    }

    fn targets(&self) -> Vec<Target> {
        vec![
            self.add.clone(),
            self.subtract.clone(),
            self.multiply.clone(),
            self.divide.clone(),
        ]
    }

    fn route(&self, view: &StateView<'_>) -> Result<Target> {
        let target = match view.operation(&self.field)? {
            Operation::Add => &self.add,
            Operation::Subtract => &self.subtract,
            Operation::Multiply => &self.multiply,
            Operation::Divide => &self.divide,
        };
        Ok(target.clone())
    }
}

/// Routes to the tool step while the latest message carries function calls
pub struct ToolCallRouter {
    messages: String,
    tools: Target,
    otherwise: Target,
}

impl ToolCallRouter {
    pub fn new(messages: &str, tools: impl Into<Target>) -> Self {
        Self {
            messages: messages.to_string(),
            tools: tools.into(),
            otherwise: Target::End,
        }
    }

    pub fn otherwise(mut self, target: impl Into<Target>) -> Self {
        self.otherwise = target.into();
        self
    }
}

impl Router for ToolCallRouter {
    fn reads(&self) -> Vec<&str> {
        vec![self.messages.as_str()]
    }

    fn targets(&self) -> Vec<Target> {
        vec![self.tools.clone(), self.otherwise.clone()]
    }

    fn route(&self, view: &StateView<'_>) -> Result<Target> {
        let pending = view
            .messages(&self.messages)?
            .last()
            .map(|m| m.has_function_calls())
            .unwrap_or(false);

        Ok(if pending {
            self.tools.clone()
        } else {
            self.otherwise.clone()
        })
    }
}

type Predicate = Box<dyn Fn(&StateView<'_>) -> Result<bool> + Send + Sync>;

/// Ordered `(target, predicate)` branches; the first match wins
pub struct PredicateRouter {
    reads: Vec<String>,
    branches: Vec<(Target, Predicate)>,
}

impl PredicateRouter {
    pub fn new(reads: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|s| s.to_string()).collect(),
            branches: Vec::new(),
        }
    }

    pub fn branch<F>(mut self, target: impl Into<Target>, predicate: F) -> Self
    where
        F: Fn(&StateView<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        self.branches.push((target.into(), Box::new(predicate)));
        self
    }
}

impl Router for PredicateRouter {
    fn reads(&self) -> Vec<&str> {
        self.reads.iter().map(String::as_str).collect()
    }

    fn targets(&self) -> Vec<Target> {
        self.branches.iter().map(|(t, _)| t.clone()).collect()
    }

    fn route(&self, view: &StateView<'_>) -> Result<Target> {
        for (target, predicate) in &self.branches {
            if predicate(view)? {
                return Ok(target.clone());
            }
        }
        Err(PathwayError::NoMatchingRoute {
            from: view.owner().to_string(),
        })
    }
}

/// Branches on textual `when` conditions, with an optional fallback
#[derive(Default)]
pub struct ConditionRouter {
    reads: Vec<String>,
    branches: Vec<(Expression, Target)>,
    otherwise: Option<Target>,
}

impl ConditionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch; fails if `when` does not parse
    pub fn branch(mut self, when: &str, target: impl Into<Target>) -> Result<Self> {
        let expr = condition::parse(when)?;
        for field in expr.fields() {
            if !self.reads.iter().any(|r| r == field) {
                self.reads.push(field.to_string());
            }
        }
        self.branches.push((expr, target.into()));
        Ok(self)
    }

    pub fn otherwise(mut self, target: impl Into<Target>) -> Self {
        self.otherwise = Some(target.into());
        self
    }
}

impl Router for ConditionRouter {
    fn reads(&self) -> Vec<&str> {
        self.reads.iter().map(String::as_str).collect()
    }

    fn targets(&self) -> Vec<Target> {
        self.branches
            .iter()
            .map(|(_, t)| t.clone())
            .chain(self.otherwise.clone())
            .collect()
    }

    fn route(&self, view: &StateView<'_>) -> Result<Target> {
        for (expr, target) in &self.branches {
            if condition::evaluate(expr, view)? {
                return Ok(target.clone());
            }
        }
        self.otherwise
            .clone()
            .ok_or_else(|| PathwayError::NoMatchingRoute {
                from: view.owner().to_string(),
            })
    }
}
