// SPDX-License-Identifier: MIT

//! Typed error handling for pathway-rs
//!
//! Every fallible operation in the crate returns [`Result`]. All variants are
//! fatal for the run that raised them; the CLI reports them and keeps reading
//! input.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PathwayError>;

/// Top-level error type for pathway-rs
#[derive(Debug, Error)]
pub enum PathwayError {
    /// Configuration errors (missing credential, bad endpoint, bad override)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field required by the graph is absent from the initial state
    #[error("Missing required state field '{0}'")]
    MissingField(String),

    /// The upstream service rejected the credential
    #[error("Authentication rejected by {provider}: {message}")]
    Auth { provider: String, message: String },

    /// The upstream service failed or returned an unexpected shape
    #[error("Upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },

    /// The upstream call did not complete in time
    #[error("Upstream request to {provider} timed out after {after_secs}s")]
    UpstreamTimeout { provider: String, after_secs: u64 },

    /// Sequential division hit a zero divisor
    #[error("Division by zero (operand at position {position})")]
    DivisionByZero { position: usize },

    /// The graph kept running past its tick budget
    #[error("Execution budget exceeded: no terminal reached after {limit} steps")]
    ExecutionBudgetExceeded { limit: u32 },

    /// Operation symbol outside `+ - * /`
    #[error("Unknown operation: '{0}'")]
    UnknownOperation(String),

    /// Graph structure failed validation
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// A predicate router had no matching branch
    #[error("No route matched after step '{from}'")]
    NoMatchingRoute { from: String },

    /// A step or router touched a field outside its declared contract
    #[error("'{owner}' accessed undeclared field '{field}'")]
    UndeclaredField { owner: String, field: String },

    /// A field holds a value of the wrong type
    #[error("Field '{field}' is not a {expected}")]
    FieldType { field: String, expected: String },

    /// Aggregation that needs a seed received no numbers
    #[error("The {operation} of an empty list is undefined")]
    EmptyOperands { operation: String },

    /// Model call with no conversation to send
    #[error("No messages in the state to process")]
    EmptyConversation,

    /// Tool received malformed arguments
    #[error("Invalid arguments for tool '{tool}': {message}")]
    ToolArguments { tool: String, message: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl PathwayError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an auth error
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid graph error
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph(message.into())
    }

    pub fn undeclared(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UndeclaredField {
            owner: owner.into(),
            field: field.into(),
        }
    }

    pub fn field_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::FieldType {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Whether an immediate retry of the failed model call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::UpstreamTimeout { .. })
    }
}
