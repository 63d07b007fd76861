// SPDX-License-Identifier: MIT

//! GitHub Models - hosted inference behind a GitHub token
//!
//! GitHub Models exposes the chat-completions format under
//! `https://models.github.ai/inference`, with model ids namespaced by
//! publisher (`openai/gpt-4.1`).

use super::openai::OpenAIModel;
use super::{GenerationConfig, Message, Model, ModelConfig};
use crate::adk::error::Result;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_PUBLISHER: &str = "openai";

/// GitHub Models implementation, delegating the wire format to [`OpenAIModel`]
pub struct GitHubModel {
    inner: OpenAIModel,
}

impl GitHubModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let model_name = qualify_model_id(&config.model_id);
        Ok(Self {
            inner: OpenAIModel::with_model_name(config, model_name)?,
        })
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Bare ids like `gpt-4o-mini` become `openai/gpt-4o-mini`
fn qualify_model_id(model_id: &str) -> String {
    if model_id.contains('/') {
        model_id.to_string()
    } else {
        format!("{}/{}", DEFAULT_PUBLISHER, model_id)
    }
}

#[async_trait]
impl Model for GitHubModel {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message> {
        self.inner.generate_content(history, config, tools).await
    }
}
