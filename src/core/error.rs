// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core error types for the tag filter.
//!
//! Fatal conditions (registry problems, internal graph-construction errors,
//! invalid parameters) abort processing. Everything else, such as ambiguous
//! tag groups, unregistered coarse codes and malformed hit lines, is reported
//! and processing continues.

use thiserror::Error;

use crate::core::tag::{CoarseCode, NominalFreqKhz, TagId};

/// Result type for tag-filter operations
pub type TagFilterResult<T> = Result<T, TagFilterError>;

#[derive(Error, Debug)]
pub enum TagFilterError {
    /// The tag registry file could not be read or parsed.
    #[error("registry error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Registry { message: String, line: Option<u64> },

    /// Internal invariant violated while building a DFA graph.
    #[error("graph construction error: {message}")]
    GraphConstruction { message: String },

    /// Tags that remain indistinguishable at the confirmation depth; raised
    /// only when `fail_on_ambiguity` is set, otherwise logged as a warning.
    #[error("tags on code {code} at {freq} not distinguishable after {depth} bursts: {tags:?}")]
    AmbiguousTags {
        freq: NominalFreqKhz,
        code: CoarseCode,
        depth: u32,
        tags: Vec<TagId>,
    },

    /// A configuration value is out of range.
    #[error("invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl TagFilterError {
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
            line: None,
        }
    }

    pub fn registry_at_line(message: impl Into<String>, line: u64) -> Self {
        Self::Registry {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn graph(message: impl Into<String>) -> Self {
        Self::GraphConstruction {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
