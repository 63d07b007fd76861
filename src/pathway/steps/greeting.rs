// SPDX-License-Identifier: MIT

use super::fields::{MESSAGE, NAME};
use crate::adk::error::Result;
use crate::pathway::graph::Step;
use crate::pathway::state::{StateUpdate, StateView};
use async_trait::async_trait;

/// Writes a greeting into `message`, personalised when `name` is non-empty
#[derive(Debug, Clone, Default)]
pub struct GreetingStep {
    sign_off: Option<String>,
}

impl GreetingStep {
    /// `Hello {name}!` / `Hello there!`
    pub fn new() -> Self {
        Self::default()
    }

    /// `Hello {name} from {sign_off}!` / `Hello from {sign_off}!`
    pub fn with_sign_off(sign_off: &str) -> Self {
        Self {
            sign_off: Some(sign_off.to_string()),
        }
    }

    pub fn greet(&self, name: &str) -> String {
        match (&self.sign_off, name.is_empty()) {
            (None, false) => format!("Hello {}!", name),
            (None, true) => "Hello there!".to_string(),
            (Some(from), false) => format!("Hello {} from {}!", name, from),
            (Some(from), true) => format!("Hello from {}!", from),
        }
    }
}

#[async_trait]
impl Step for GreetingStep {
    fn reads(&self) -> Vec<&str> {
        vec![NAME]
    }

    fn writes(&self) -> Vec<&str> {
        vec![MESSAGE]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let message = self.greet(view.text(NAME)?);
        Ok(StateUpdate::new().set(MESSAGE, message))
    }
}
