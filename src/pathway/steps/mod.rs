// SPDX-License-Identifier: MIT

//! Built-in steps
//!
//! Each step reads and writes the conventional field names in [`fields`].
//! Text-building steps read the current `message` and write the whole new
//! value, so they work with the default overwrite reducer. The model and
//! tool steps append to `messages`, which must use the append reducer.

mod aggregate;
mod greeting;
mod model_call;
mod profile;
mod tool_call;

pub use aggregate::{AggregateStep, CalculateStep, Output};
pub use greeting::GreetingStep;
pub use model_call::ModelCallStep;
pub use profile::{AgeCheckStep, SkillsStep};
pub use tool_call::ToolStep;

/// Conventional state field names
pub mod fields {
    pub const NAME: &str = "name";
    pub const AGE: &str = "age";
    pub const SKILLS: &str = "skills";
    pub const MESSAGE: &str = "message";
    pub const NUMBERS: &str = "numbers";
    pub const OPERATION: &str = "operation";
    pub const RESULT: &str = "result";
    pub const MESSAGES: &str = "messages";
}
