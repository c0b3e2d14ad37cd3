// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic finite automaton over burst gaps.

pub mod graph;
pub mod node;

pub use graph::DfaGraph;
pub use node::{DfaState, StateId};
