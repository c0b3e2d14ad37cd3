// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interning table for antenna and codeset labels.
//!
//! Hit records carry small dense integer ids instead of owned strings; the
//! table maps both directions and preserves insertion order.

use std::collections::HashMap;

/// Dense id of an interned label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

#[derive(Debug, Default)]
pub struct LabelTable {
    labels: Vec<String>,
    index: HashMap<String, LabelId>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `label`, returning the existing id when already present.
    pub fn intern(&mut self, label: &str) -> LabelId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }

    pub fn resolve(&self, id: LabelId) -> Option<&str> {
        self.labels.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
