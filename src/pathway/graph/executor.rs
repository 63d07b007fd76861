// SPDX-License-Identifier: MIT

//! Graph executor: the tick loop

use super::edge::{Edge, Target};
use super::event::GraphEvent;
use super::step::Step;
use crate::adk::error::{PathwayError, Result};
use crate::pathway::state::State;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Compiled step with its cached field contract and outgoing edge
pub(super) struct Node {
    step: Arc<dyn Step>,
    pub(super) reads: Vec<String>,
    pub(super) writes: Vec<String>,
    pub(super) router_reads: Vec<String>,
    edge: Option<Edge>,
}

impl Node {
    pub(super) fn new(step: Arc<dyn Step>, edge: Option<Edge>) -> Self {
        let owned = |fields: Vec<&str>| -> Vec<String> { fields.into_iter().map(str::to_string).collect() };
        let reads = owned(step.reads());
        let writes = owned(step.writes());
        let router_reads = match &edge {
            Some(Edge::Conditional(router)) => owned(router.reads()),
            _ => Vec::new(),
        };
        Self {
            step,
            reads,
            writes,
            router_reads,
            edge,
        }
    }
}

/// Immutable, validated graph ready to run.
///
/// Built by [`GraphBuilder::compile`](super::GraphBuilder::compile); each
/// invocation gets a fresh [`State`] and runs sequentially on the caller's task.
pub struct CompiledGraph {
    pub(super) name: String,
    pub(super) nodes: HashMap<String, Node>,
    pub(super) order: Vec<String>,
    pub(super) entry: String,
    pub(super) max_iterations: u32,
    pub(super) required: Vec<String>,
}

impl CompiledGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Step names in registration order
    pub fn step_names(&self) -> &[String] {
        &self.order
    }

    /// Fields the initial state must hold
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run from the entry point to a terminal
    pub async fn invoke(&self, state: State) -> Result<State> {
        self.run(state, None).await
    }

    /// Like [`invoke`](Self::invoke), reporting progress on `events`.
    /// A closed receiver does not stop the run.
    pub async fn stream(
        &self,
        state: State,
        events: mpsc::UnboundedSender<GraphEvent>,
    ) -> Result<State> {
        self.run(state, Some(&events)).await
    }

    async fn run(
        &self,
        mut state: State,
        events: Option<&mpsc::UnboundedSender<GraphEvent>>,
    ) -> Result<State> {
        let emit = |event: GraphEvent| {
            if let Some(tx) = events {
                let _ = tx.send(event);
            }
        };

        if let Some(missing) = self.required.iter().find(|f| !state.contains(f)) {
            return Err(PathwayError::MissingField(missing.clone()));
        }

        log::info!("Running graph '{}' from '{}'", self.name, self.entry);
        let mut current = self.entry.clone();
        let mut tick = 0u32;

        loop {
            if tick >= self.max_iterations {
                log::error!(
                    "Graph '{}' exceeded its budget of {} steps",
                    self.name,
                    self.max_iterations
                );
                return Err(PathwayError::ExecutionBudgetExceeded {
                    limit: self.max_iterations,
                });
            }
            tick += 1;

            let node = self.nodes.get(&current).ok_or_else(|| {
                PathwayError::invalid_graph(format!("step '{}' is not registered", current))
            })?;

            log::debug!("Tick {}/{}: step '{}'", tick, self.max_iterations, current);
            emit(GraphEvent::StepStarted {
                step: current.clone(),
                tick,
            });

            let update = node.step.apply(state.view(&current, &node.reads)).await?;
            if let Some(field) = update.fields().find(|f| !node.writes.iter().any(|w| w == f)) {
                return Err(PathwayError::undeclared(current.as_str(), field));
            }
            emit(GraphEvent::StepCompleted {
                step: current.clone(),
                update: update.clone(),
            });
            state.apply(update)?;

            let next = match &node.edge {
                None => Target::End,
                Some(Edge::Direct(target)) => target.clone(),
                Some(Edge::Conditional(router)) => {
                    router.route(&state.view(&current, &node.router_reads))?
                }
            };
            log::debug!("Route '{}' -> '{}'", current, next);
            emit(GraphEvent::Routed {
                from: current.clone(),
                to: next.clone(),
            });

            match next {
                Target::End => {
                    log::info!("Graph '{}' finished after {} steps", self.name, tick);
                    emit(GraphEvent::Finished { ticks: tick });
                    return Ok(state);
                }
                Target::Step(name) => current = name,
            }
        }
    }
}
