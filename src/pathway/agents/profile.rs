// SPDX-License-Identifier: MIT

//! Greeting playgrounds: the signed greeter and the profile pipeline

use crate::adk::error::Result;
use crate::pathway::graph::{CompiledGraph, GraphBuilder};
use crate::pathway::state::{FieldDef, FieldType, State, StateSchema};
use crate::pathway::steps::fields::{AGE, MESSAGE, NAME, SKILLS};
use crate::pathway::steps::{AgeCheckStep, GreetingStep, SkillsStep};
use serde_json::json;

/// Who the greeter signs its messages as
pub const SIGN_OFF: &str = "aws-agent";

fn greeting_schema() -> StateSchema {
    StateSchema::new()
        .field_def(NAME, FieldDef::new(FieldType::Text).with_default(json!("")))
        .field_def(MESSAGE, FieldDef::new(FieldType::Text).with_default(json!("")))
}

/// `greet` only: `Hello {name} from aws-agent!`
pub fn greeter_graph() -> Result<CompiledGraph> {
    GraphBuilder::new("greeter")
        .add_step("greet", GreetingStep::with_sign_off(SIGN_OFF))
        .set_entry_point("greet")
        .compile()
}

pub fn greeter_state(name: &str) -> Result<State> {
    State::new(&greeting_schema())?.with(NAME, name)
}

/// `greet` → `check_age` → `check_skills`
pub fn profile_graph() -> Result<CompiledGraph> {
    GraphBuilder::new("profile")
        .add_step("greet", GreetingStep::new())
        .add_step("check_age", AgeCheckStep)
        .add_step("check_skills", SkillsStep)
        .set_entry_point("greet")
        .add_edge("greet", "check_age")
        .add_edge("check_age", "check_skills")
        .add_edge("check_skills", "END")
        .compile()
}

pub fn profile_state(name: &str, age: f64, skills: Vec<String>) -> Result<State> {
    let schema = greeting_schema()
        .field(AGE, FieldType::Number)
        .field_def(SKILLS, FieldDef::new(FieldType::Texts).with_default(json!([])));

    State::new(&schema)?
        .with(NAME, name)?
        .with(AGE, age)?
        .with(SKILLS, skills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::PathwayError;
    use crate::pathway::state::Value;

    #[tokio::test]
    async fn test_greeter_signs_message() {
        let graph = greeter_graph().unwrap();
        let state = graph.invoke(greeter_state("Benjamin").unwrap()).await.unwrap();
        assert_eq!(
            state.get(MESSAGE),
            Some(&Value::from("Hello Benjamin from aws-agent!"))
        );

        let state = graph.invoke(greeter_state("").unwrap()).await.unwrap();
        assert_eq!(state.get(MESSAGE), Some(&Value::from("Hello from aws-agent!")));
    }

    #[tokio::test]
    async fn test_profile_pipeline() {
        let graph = profile_graph().unwrap();
        assert_eq!(graph.step_names(), &["greet", "check_age", "check_skills"]);

        let state = profile_state("Ada", 12.0, vec![]).unwrap();
        let state = graph.invoke(state).await.unwrap();
        assert_eq!(
            state.get(MESSAGE),
            Some(&Value::from("Hello Ada! You are a minor. You have no skills listed."))
        );
    }

    #[tokio::test]
    async fn test_profile_requires_age() {
        let schema = greeting_schema().field(AGE, FieldType::Number).field(SKILLS, FieldType::Texts);
        let state = State::new(&schema)
            .unwrap()
            .with(SKILLS, vec!["Rust".to_string()])
            .unwrap();

        let err = profile_graph().unwrap().invoke(state).await.unwrap_err();
        assert!(matches!(err, PathwayError::MissingField(f) if f == AGE));
    }
}
