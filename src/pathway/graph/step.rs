// SPDX-License-Identifier: MIT

//! The step contract: declared reads/writes and an async transform

use crate::adk::error::Result;
use crate::pathway::state::{StateUpdate, StateView};
use async_trait::async_trait;

/// A named transformation in a graph.
///
/// The executor hands `apply` a view exposing only the fields in `reads`,
/// and rejects an update touching a field outside `writes`.
#[async_trait]
pub trait Step: Send + Sync {
    /// Fields this step reads
    fn reads(&self) -> Vec<&str>;

    /// Fields this step may write
    fn writes(&self) -> Vec<&str>;

    /// Written fields whose updates hold only new entries. These must be
    /// merged with the append reducer; every other written field must not.
    fn appends(&self) -> Vec<&str> {
        Vec::new()
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate>;
}

/// Closure-backed step for ad-hoc graphs
pub struct FnStep<F> {
    reads: Vec<String>,
    writes: Vec<String>,
    func: F,
}

impl<F> FnStep<F>
where
    F: Fn(&StateView<'_>) -> Result<StateUpdate> + Send + Sync,
{
    pub fn new(reads: &[&str], writes: &[&str], func: F) -> Self {
        Self {
            reads: reads.iter().map(|s| s.to_string()).collect(),
            writes: writes.iter().map(|s| s.to_string()).collect(),
            func,
        }
    }
}

#[async_trait]
impl<F> Step for FnStep<F>
where
    F: Fn(&StateView<'_>) -> Result<StateUpdate> + Send + Sync,
{
    fn reads(&self) -> Vec<&str> {
        self.reads.iter().map(String::as_str).collect()
    }

    fn writes(&self) -> Vec<&str> {
        self.writes.iter().map(String::as_str).collect()
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        (self.func)(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::state::{FieldType, State, StateSchema, Value};

    #[tokio::test]
    async fn test_fn_step_applies_closure() {
        let step = FnStep::new(&["name"], &["message"], |view| {
            let name = view.text("name")?;
            Ok(StateUpdate::new().set("message", format!("Hi {}", name)))
        });
        assert_eq!(step.reads(), vec!["name"]);
        assert_eq!(step.writes(), vec!["message"]);

        let schema = StateSchema::new()
            .field("name", FieldType::Text)
            .field("message", FieldType::Text);
        let state = State::new(&schema).unwrap().with("name", "Ada").unwrap();
        let reads = vec!["name".to_string()];

        let update = step.apply(state.view("hi", &reads)).await.unwrap();
        assert_eq!(update.get("message"), Some(&Value::from("Hi Ada")));
    }
}
