// SPDX-License-Identifier: MIT

use super::edge::Target;
use crate::pathway::state::StateUpdate;

/// Progress reported by [`CompiledGraph::stream`](super::CompiledGraph::stream)
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    StepStarted { step: String, tick: u32 },
    StepCompleted { step: String, update: StateUpdate },
    Routed { from: String, to: Target },
    Finished { ticks: u32 },
}
