// SPDX-License-Identifier: MIT

//! OpenAI Model - chat-completions API implementation
//!
//! The same wire format is spoken by the GitHub Models endpoint, see
//! [`super::github`].

use super::{GenerationConfig, Message, Model, ModelConfig, Part, Role};
use crate::adk::error::{PathwayError, Result};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// OpenAI chat-completions model implementation
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    url: String,
    provider: String,
    timeout: Duration,
    retries: u32,
}

impl OpenAIModel {
    /// Create a new OpenAIModel from a resolved config
    pub fn new(config: &ModelConfig) -> Result<Self> {
        Self::with_model_name(config, config.model_id.clone())
    }

    pub(super) fn with_model_name(config: &ModelConfig, model_name: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PathwayError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model_name,
            url: config.completions_url(),
            provider: config.provider.label().to_string(),
            timeout: config.timeout,
            retries: config.retries,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Convert internal Message to OpenAI message format
    fn message_to_openai(message: &Message) -> Value {
        let role = match message.role {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        // Tool results are sent one per message, keyed by the call id
        for part in &message.parts {
            if let Part::FunctionResponse { id, response, .. } = part {
                return json!({
                    "role": "tool",
                    "tool_call_id": id,
                    "content": serde_json::to_string(response).unwrap_or_default()
                });
            }
        }

        let mut tool_calls = Vec::new();
        let mut text_content = String::new();

        for part in &message.parts {
            match part {
                Part::Text(t) => text_content.push_str(t),
                Part::FunctionCall { id, name, args } => {
                    tool_calls.push(json!({
                        "id": id,
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": serde_json::to_string(args).unwrap_or_default()
                        }
                    }));
                }
                Part::FunctionResponse { .. } => {}
            }
        }

        if !tool_calls.is_empty() {
            json!({
                "role": role,
                "content": if text_content.is_empty() { Value::Null } else { json!(text_content) },
                "tool_calls": tool_calls
            })
        } else {
            json!({
                "role": role,
                "content": text_content
            })
        }
    }

    /// Convert tools to OpenAI function format
    fn tools_to_openai_format(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    fn build_body(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let messages: Vec<Value> = history.iter().map(Self::message_to_openai).collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
        }

        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = json!(Self::tools_to_openai_format(tools));
                body["tool_choice"] = json!("auto");
            }
        }

        body
    }

    /// Parse a chat-completions response into an assistant Message
    fn parse_openai_response(provider: &str, response: &Value) -> Result<Message> {
        let choice = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| PathwayError::upstream(provider, "No choices in response"))?;

        let message = &choice["message"];
        match message["role"].as_str() {
            Some("assistant") => {}
            other => {
                return Err(PathwayError::upstream(
                    provider,
                    format!("Response is not an assistant message (role: {:?})", other),
                ))
            }
        }

        let mut parts = Vec::new();

        if let Some(content) = message["content"].as_str() {
            let content = content.trim();
            if !content.is_empty() {
                parts.push(Part::Text(content.to_string()));
            }
        }

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            for tc in tool_calls {
                let name = tc["function"]["name"]
                    .as_str()
                    .ok_or_else(|| PathwayError::upstream(provider, "Tool call without a name"))?
                    .to_string();
                let id = tc["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
                let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");
                let args: Value = serde_json::from_str(args_str).map_err(|e| {
                    PathwayError::upstream(
                        provider,
                        format!("Malformed arguments for tool call '{}': {}", name, e),
                    )
                })?;

                parts.push(Part::FunctionCall { id, name, args });
            }
        }

        Ok(Message {
            role: Role::Assistant,
            parts,
        })
    }

    fn classify_status(provider: &str, status: StatusCode, text: String) -> PathwayError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PathwayError::auth(provider, text),
            _ => PathwayError::upstream(provider, format!("{}: {}", status, text)),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> PathwayError {
        if err.is_timeout() {
            PathwayError::UpstreamTimeout {
                provider: self.provider.clone(),
                after_secs: self.timeout.as_secs(),
            }
        } else {
            PathwayError::upstream(&self.provider, err.to_string())
        }
    }

    async fn send_once(&self, body: &Value) -> Result<Message> {
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::classify_status(&self.provider, status, text));
        }

        let resp_json: Value = resp.json().await.map_err(|e| self.transport_error(e))?;
        log::debug!("{} response: {}", self.provider, resp_json);

        Self::parse_openai_response(&self.provider, &resp_json)
    }
}

#[async_trait]
impl Model for OpenAIModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message> {
        let body = self.build_body(history, config, tools);
        log::debug!(
            "{} request body: {}",
            self.provider,
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        with_retries(&self.provider, self.retries, || self.send_once(&body)).await
    }
}

/// Run `send`, retrying immediately up to `retries` times while the error
/// is retryable
async fn with_retries<T, F, Fut>(provider: &str, retries: u32, mut send: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Err(e) if e.is_retryable() && attempt < retries => {
                attempt += 1;
                log::warn!(
                    "{} call failed ({}), retrying {}/{}",
                    provider,
                    e,
                    attempt,
                    retries
                );
            }
            result => return result,
        }
    }
}
