// SPDX-License-Identifier: MIT

use crate::adk::error::{PathwayError, Result};
use crate::adk::model::{GenerationConfig, Message, Model, Role};
use crate::pathway::graph::{CompiledGraph, GraphBuilder, GraphEvent};
use crate::pathway::state::{FieldDef, FieldType, Reducer, State, StateSchema};
use crate::pathway::steps::fields::MESSAGES;
use crate::pathway::steps::ModelCallStep;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A single `messages` field merged with the append reducer
pub fn conversation_schema() -> StateSchema {
    StateSchema::new().field_def(
        MESSAGES,
        FieldDef::new(FieldType::Messages).with_reducer(Reducer::Append),
    )
}

/// Single `process` step that forwards the conversation to `model`
pub fn chat_graph(model: Arc<dyn Model>, config: GenerationConfig) -> Result<CompiledGraph> {
    GraphBuilder::new("chat")
        .add_step("process", ModelCallStep::new(model).with_config(config))
        .set_entry_point("process")
        .add_edge("process", "END")
        .compile()
}

/// A multi-turn conversation driven through a compiled graph.
///
/// Each turn appends the human message, runs the graph over the whole
/// conversation and keeps what the graph returns. A failed turn leaves the
/// conversation as it was before the turn.
pub struct ChatSession {
    graph: CompiledGraph,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(graph: CompiledGraph) -> Self {
        Self {
            graph,
            history: Vec::new(),
        }
    }

    /// Seed the conversation with a system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.history.insert(0, Message::system(prompt));
        self
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Run one turn and return the latest assistant reply
    pub async fn send(&mut self, input: &str) -> Result<Message> {
        self.turn(input, None).await
    }

    /// Like [`send`](Self::send), reporting graph progress on `events`
    pub async fn send_streaming(
        &mut self,
        input: &str,
        events: mpsc::UnboundedSender<GraphEvent>,
    ) -> Result<Message> {
        self.turn(input, Some(events)).await
    }

    async fn turn(
        &mut self,
        input: &str,
        events: Option<mpsc::UnboundedSender<GraphEvent>>,
    ) -> Result<Message> {
        let mut conversation = self.history.clone();
        conversation.push(Message::human(input));
        let state = State::new(&conversation_schema())?.with(MESSAGES, conversation)?;

        let state = match events {
            Some(tx) => self.graph.stream(state, tx).await?,
            None => self.graph.invoke(state).await?,
        };

        let conversation = state
            .get(MESSAGES)
            .and_then(|v| v.as_messages())
            .ok_or_else(|| PathwayError::MissingField(MESSAGES.to_string()))?;
        let reply = conversation
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .cloned()
            .ok_or_else(|| {
                PathwayError::upstream(self.graph.name(), "Conversation has no assistant reply")
            })?;

        log::debug!(
            "Turn complete: {} -> {} messages",
            self.history.len(),
            conversation.len()
        );
        self.history = conversation.to_vec();
        Ok(reply)
    }
}
