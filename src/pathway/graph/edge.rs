// SPDX-License-Identifier: MIT

//! Edge types for graph control flow

use super::router::Router;
use std::fmt;
use std::sync::Arc;

/// Name of the terminal in textual graph definitions
pub const END: &str = "END";

/// Target of an edge
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Specific step
    Step(String),
    /// End of the run
    End,
}

impl Target {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::Step(name) => Some(name),
            Self::End => None,
        }
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        if s == END {
            Self::End
        } else {
            Self::Step(s.to_string())
        }
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::from(s.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(name) => f.write_str(name),
            Self::End => f.write_str(END),
        }
    }
}

/// Outgoing edge of a step
#[derive(Clone)]
pub enum Edge {
    /// Always go to the target
    Direct(Target),
    /// Ask the router
    Conditional(Arc<dyn Router>),
}

impl Edge {
    /// Every target this edge can select
    pub fn targets(&self) -> Vec<Target> {
        match self {
            Self::Direct(target) => vec![target.clone()],
            Self::Conditional(router) => router.targets(),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(target) => f.debug_tuple("Direct").field(target).finish(),
            Self::Conditional(router) => f
                .debug_struct("Conditional")
                .field("targets", &router.targets())
                .finish(),
        }
    }
}
