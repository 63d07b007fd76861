// SPDX-License-Identifier: MIT

//! State management for graph execution
//!
//! This module provides:
//! - `StateSchema` - defines the fields, types and reducers of a state
//! - `State` - runtime storage with reducer support
//! - `StateView` - the slice of a state a step or router declared it reads
//! - `StateUpdate` - the patch a step returns

pub mod operation;
mod schema;
mod store;
mod value;

pub use operation::Operation;
pub use schema::{FieldDef, Reducer, StateSchema};
pub use store::{State, StateUpdate, StateView};
pub use value::{format_numbers, FieldType, Value};
