// SPDX-License-Identifier: MIT

//! Graph construction and compile-time validation

use super::edge::{Edge, Target, END};
use super::executor::{CompiledGraph, Node};
use super::router::Router;
use super::step::Step;
use crate::adk::error::{PathwayError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Default tick budget for a run
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Collects steps and edges, then validates them into a [`CompiledGraph`]
pub struct GraphBuilder {
    name: String,
    steps: Vec<(String, Arc<dyn Step>)>,
    edges: Vec<(String, Edge)>,
    entry: Option<String>,
    max_iterations: u32,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            edges: Vec::new(),
            entry: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn add_step<S: Step + 'static>(self, name: &str, step: S) -> Self {
        self.add_shared_step(name, Arc::new(step))
    }

    pub fn add_shared_step(mut self, name: &str, step: Arc<dyn Step>) -> Self {
        self.steps.push((name.to_string(), step));
        self
    }

    pub fn set_entry_point(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    pub fn add_edge(mut self, from: &str, to: impl Into<Target>) -> Self {
        self.edges.push((from.to_string(), Edge::Direct(to.into())));
        self
    }

    pub fn add_conditional_edges<R: Router + 'static>(self, from: &str, router: R) -> Self {
        self.add_shared_conditional_edges(from, Arc::new(router))
    }

    pub fn add_shared_conditional_edges(mut self, from: &str, router: Arc<dyn Router>) -> Self {
        self.edges.push((from.to_string(), Edge::Conditional(router)));
        self
    }

    pub fn max_iterations(mut self, limit: u32) -> Self {
        self.max_iterations = limit;
        self
    }

    /// Validate the structure and freeze it
    pub fn compile(self) -> Result<CompiledGraph> {
        if self.max_iterations == 0 {
            return Err(PathwayError::invalid_graph("max_iterations must be at least 1"));
        }

        let mut steps: HashMap<String, Arc<dyn Step>> = HashMap::new();
        let mut order = Vec::new();
        for (name, step) in self.steps {
            if name == END {
                return Err(PathwayError::invalid_graph(format!(
                    "'{}' is reserved for the terminal",
                    END
                )));
            }
            if steps.insert(name.clone(), step).is_some() {
                return Err(PathwayError::invalid_graph(format!(
                    "duplicate step '{}'",
                    name
                )));
            }
            order.push(name);
        }

        let entry = self
            .entry
            .ok_or_else(|| PathwayError::invalid_graph("no entry point set"))?;
        if !steps.contains_key(&entry) {
            return Err(PathwayError::invalid_graph(format!(
                "entry point '{}' is not a registered step",
                entry
            )));
        }

        let mut edges: HashMap<String, Edge> = HashMap::new();
        for (from, edge) in self.edges {
            if !steps.contains_key(&from) {
                return Err(PathwayError::invalid_graph(format!(
                    "edge from unregistered step '{}'",
                    from
                )));
            }
            for target in edge.targets() {
                if let Target::Step(to) = &target {
                    if !steps.contains_key(to) {
                        return Err(PathwayError::invalid_graph(format!(
                            "edge from '{}' to unregistered step '{}'",
                            from, to
                        )));
                    }
                }
            }
            if edges.insert(from.clone(), edge).is_some() {
                return Err(PathwayError::invalid_graph(format!(
                    "step '{}' has more than one outgoing edge",
                    from
                )));
            }
        }

        let nodes: HashMap<String, Node> = steps
            .into_iter()
            .map(|(name, step)| {
                let edge = edges.remove(&name);
                (name, Node::new(step, edge))
            })
            .collect();

        let required = required_fields(&entry, &order, &nodes);
        log::debug!(
            "Compiled graph '{}': {} steps, entry '{}', requires {:?}",
            self.name,
            order.len(),
            entry,
            required
        );

        Ok(CompiledGraph {
            name: self.name,
            nodes,
            order,
            entry,
            max_iterations: self.max_iterations,
            required,
        })
    }
}

/// Fields the caller must supply: everything the entry step reads, plus
/// every field some step or router reads that no step writes.
fn required_fields(entry: &str, order: &[String], nodes: &HashMap<String, Node>) -> Vec<String> {
    let written: HashSet<&str> = nodes
        .values()
        .flat_map(|n| n.writes.iter().map(String::as_str))
        .collect();

    let mut required: Vec<String> = nodes
        .get(entry)
        .map(|n| n.reads.clone())
        .unwrap_or_default();

    for name in order {
        let Some(node) = nodes.get(name) else { continue };
        for field in node.reads.iter().chain(&node.router_reads) {
            if !written.contains(field.as_str()) && !required.contains(field) {
                required.push(field.clone());
            }
        }
    }
    required
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::graph::{FnStep, PredicateRouter};
    use crate::pathway::state::{StateUpdate, StateView};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Step for Noop {
        fn reads(&self) -> Vec<&str> {
            vec![]
        }

        fn writes(&self) -> Vec<&str> {
            vec![]
        }

        async fn apply(&self, _view: StateView<'_>) -> Result<StateUpdate> {
            Ok(StateUpdate::new())
        }
    }

    fn noop() -> Noop {
        Noop
    }

    fn assert_invalid(builder: GraphBuilder, needle: &str) {
        match builder.compile() {
            Err(PathwayError::InvalidGraph(msg)) => {
                assert!(msg.contains(needle), "'{}' does not mention '{}'", msg, needle)
            }
            Err(other) => panic!("expected InvalidGraph, got {:?}", other),
            Ok(_) => panic!("expected InvalidGraph, graph compiled"),
        }
    }

    #[test]
    fn test_missing_entry_point() {
        assert_invalid(GraphBuilder::new("g").add_step("a", noop()), "no entry point");
        assert_invalid(
            GraphBuilder::new("g").add_step("a", noop()).set_entry_point("b"),
            "entry point 'b'",
        );
    }

    #[test]
    fn test_duplicate_step() {
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .add_step("a", noop())
                .set_entry_point("a"),
            "duplicate step 'a'",
        );
    }

    #[test]
    fn test_unregistered_targets() {
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .set_entry_point("a")
                .add_edge("a", "unknown"),
            "unregistered step 'unknown'",
        );
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .set_entry_point("a")
                .add_conditional_edges("a", PredicateRouter::new(&[]).branch("missing", |_| Ok(true))),
            "unregistered step 'missing'",
        );
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .set_entry_point("a")
                .add_edge("b", END),
            "edge from unregistered step 'b'",
        );
    }

    #[test]
    fn test_single_outgoing_edge() {
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .add_step("b", noop())
                .set_entry_point("a")
                .add_edge("a", "b")
                .add_edge("a", END),
            "more than one outgoing edge",
        );
    }

    #[test]
    fn test_reserved_name_and_zero_budget() {
        assert_invalid(
            GraphBuilder::new("g").add_step(END, noop()).set_entry_point(END),
            "reserved",
        );
        assert_invalid(
            GraphBuilder::new("g")
                .add_step("a", noop())
                .set_entry_point("a")
                .max_iterations(0),
            "max_iterations",
        );
    }

    #[test]
    fn test_required_fields_exclude_produced_ones() {
        let graph = GraphBuilder::new("profile")
            .add_step("greet", FnStep::new(&["name"], &["message"], |_| Ok(StateUpdate::new())))
            .add_step(
                "check_age",
                FnStep::new(&["age", "message"], &["message"], |_| Ok(StateUpdate::new())),
            )
            .set_entry_point("greet")
            .add_edge("greet", "check_age")
            .compile()
            .unwrap();

        assert_eq!(graph.required_fields(), &["name".to_string(), "age".to_string()]);
        assert_eq!(graph.max_iterations(), DEFAULT_MAX_ITERATIONS);
    }
}
