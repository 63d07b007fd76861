// SPDX-License-Identifier: MIT

//! Steps that extend a greeting with facts about the person

use super::fields::{AGE, MESSAGE, SKILLS};
use crate::adk::error::Result;
use crate::pathway::graph::Step;
use crate::pathway::state::{StateUpdate, StateView};
use async_trait::async_trait;

/// Age below which a person is a minor
pub const ADULT_AGE: f64 = 18.0;

/// Appends whether `age` makes the person a minor or an adult
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeCheckStep;

#[async_trait]
impl Step for AgeCheckStep {
    fn reads(&self) -> Vec<&str> {
        vec![AGE, MESSAGE]
    }

    fn writes(&self) -> Vec<&str> {
        vec![MESSAGE]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let suffix = if view.number(AGE)? < ADULT_AGE {
            " You are a minor."
        } else {
            " You are an adult."
        };
        let message = format!("{}{}", view.text(MESSAGE)?, suffix);
        Ok(StateUpdate::new().set(MESSAGE, message))
    }
}

/// Appends the comma-joined `skills`, or a fixed note when there are none
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillsStep;

#[async_trait]
impl Step for SkillsStep {
    fn reads(&self) -> Vec<&str> {
        vec![SKILLS, MESSAGE]
    }

    fn writes(&self) -> Vec<&str> {
        vec![MESSAGE]
    }

    async fn apply(&self, view: StateView<'_>) -> Result<StateUpdate> {
        let skills = view.texts(SKILLS)?;
        let suffix = if skills.is_empty() {
            " You have no skills listed.".to_string()
        } else {
            format!(" Your skills are: {}.", skills.join(", "))
        };
        let message = format!("{}{}", view.text(MESSAGE)?, suffix);
        Ok(StateUpdate::new().set(MESSAGE, message))
    }
}
