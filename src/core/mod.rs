// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core engine: tag registry, DFA construction and run tracking.

pub mod config;
pub mod dfa;
pub mod error;
pub mod hit;
pub mod interval;
pub mod labels;
pub mod output;
pub mod registry;
pub mod run;
pub mod tag;
