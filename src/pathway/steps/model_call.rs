// SPDX-License-Identifier: MIT

use super::fields::MESSAGES;
use crate::adk::error::{PathwayError, Result};
use crate::adk::model::{GenerationConfig, Message, Model, Role};
use crate::adk::tool::Tool;
use crate::pathway::graph::Step;
use crate::pathway::state::{StateUpdate, StateView};
use async_trait::async_trait;
use std::borrow::Cow;
use std::sync::Arc;

/// Sends the conversation to the model and appends its reply.
///
/// Bound tools are advertised with every request; the reply may carry
/// function calls for a [`ToolStep`](super::ToolStep) to execute.
pub struct ModelCallStep {
    model: Arc<dyn Model>,
    tools: Vec<Arc<dyn Tool>>,
    config: Option<GenerationConfig>,
    system: Option<String>,
}

impl ModelCallStep {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self {
            model,
            tools: Vec::new(),
            config: None,
            system: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Prompt sent ahead of conversations that carry no system message.
    /// It is not written back into the state.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system = Some(prompt.into());
        self
    }
}

#[async_trait]
impl Step for ModelCallStep {
    fn reads(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    fn writes(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    fn appends(&self) -> Vec<&str> {
        vec![MESSAGES]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let history = view.messages(MESSAGES)?;
        if history.is_empty() {
            return Err(PathwayError::EmptyConversation);
        }

        let request: Cow<'_, [Message]> = match &self.system {
            Some(prompt) if history[0].role != Role::System => {
                let mut seeded = Vec::with_capacity(history.len() + 1);
                seeded.push(Message::system(prompt.as_str()));
                seeded.extend_from_slice(history);
                Cow::Owned(seeded)
            }
            _ => Cow::Borrowed(history),
        };

        let tools = (!self.tools.is_empty()).then_some(self.tools.as_slice());
        log::debug!(
            "Calling {} with {} messages and {} tools",
            self.model.provider(),
            request.len(),
            self.tools.len()
        );
        let reply = self
            .model
            .generate_content(&request, self.config.as_ref(), tools)
            .await?;

        if reply.role != Role::Assistant {
            return Err(PathwayError::upstream(
                self.model.provider(),
                "Response is not an assistant message",
            ));
        }

        Ok(StateUpdate::new().set(MESSAGES, vec![reply]))
    }
}
