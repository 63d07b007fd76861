// SPDX-License-Identifier: MIT

//! Prebuilt graphs for the playground pipelines and the chat agents

mod calculator;
mod chat;
mod profile;
mod react;

pub use calculator::{
    calculator_graph, calculator_state, conditional_calculator_graph,
    conditional_calculator_state, step_for,
};
pub use chat::{chat_graph, conversation_schema, ChatSession};
pub use profile::{greeter_graph, greeter_state, profile_graph, profile_state, SIGN_OFF};
pub use react::{react_graph, REACT_MODEL, REACT_SYSTEM_PROMPT};
