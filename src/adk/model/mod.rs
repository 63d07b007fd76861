// SPDX-License-Identifier: MIT

//! Model module - the model-call collaborator
//!
//! This module provides the core Model trait and the conversation types.
//! Implementations live in their own submodules:
//! - [openai] - OpenAI chat-completions API
//! - [github] - GitHub Models inference endpoint (same wire format)
//!
//! [`connect`] picks one from a [`ModelConfig`].

pub mod config;
pub mod github;
pub mod openai;

pub use config::{ModelConfig, Provider};

use crate::adk::error::Result;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
    /// Result of a tool invocation
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "System"),
            Role::Human => write!(f, "Human"),
            Role::Assistant => write!(f, "Assistant"),
            Role::Tool => write!(f, "Tool"),
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// Parts of a message - text, function calls and their results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Part {
    /// Regular text
    Text(String),
    /// Function/tool call requested by the model
    FunctionCall {
        id: String,
        name: String,
        args: serde_json::Value,
    },
    /// Response from executing a function/tool
    FunctionResponse {
        id: String,
        name: String,
        response: serde_json::Value,
    },
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Role::Human, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pending function calls as `(id, name, args)`
    pub fn function_calls(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall { id, name, args } => {
                    Some((id.as_str(), name.as_str(), args))
                }
                _ => None,
            })
            .collect()
    }

    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, Part::FunctionCall { .. }))
    }
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    /// Provider label used in logs and errors
    fn provider(&self) -> &str;

    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message>;
}

/// Build the model implementation selected by `config.provider`
pub fn connect(config: &ModelConfig) -> Result<Arc<dyn Model>> {
    log::info!(
        "Using provider: {} with model: {}",
        config.provider,
        config.model_id
    );
    let model: Arc<dyn Model> = match config.provider {
        Provider::GitHub => Arc::new(github::GitHubModel::new(config)?),
        Provider::OpenAI => Arc::new(openai::OpenAIModel::new(config)?),
    };
    Ok(model)
}
