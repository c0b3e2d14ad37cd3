// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registered-tag database.
//!
//! Loads the delimited registration table produced at tag-registration time
//! and groups tags by (nominal frequency, coarse code), the unit a DFA
//! graph is built for. All load problems are fatal.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::warn;

use crate::core::error::{TagFilterError, TagFilterResult};
use crate::core::hit::split_quoted;
use crate::core::tag::{CoarseCode, KnownTag, NominalFreqKhz, TagId, TagRef};

/// Expected first line of a registry file.
const REGISTRY_HEADER: &str = "\"proj\",\"id\",\"tagFreq\",\"fcdFreq\",\"g1\",\"g2\",\"g3\",\"bi\",\"dfreq\",\"g1.sd\",\"g2.sd\",\"g3.sd\",\"bi.sd\",\"dfreq.sd\",\"filename\"";

const REGISTRY_FIELDS: usize = 15;

/// Index of the burst-interval column within a registry line.
const BI_FIELD: usize = 7;

#[derive(Debug, Default)]
pub struct TagRegistry {
    groups: HashMap<(NominalFreqKhz, CoarseCode), Vec<TagRef>>,
    by_id: HashMap<TagId, TagRef>,
    freqs: BTreeSet<NominalFreqKhz>,
}

impl TagRegistry {
    pub fn from_path(path: impl AsRef<Path>) -> TagFilterResult<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            TagFilterError::registry(format!("cannot open {}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> TagFilterResult<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .transpose()?
            .ok_or_else(|| TagFilterError::registry("file is empty"))?;
        if header.trim_end() != REGISTRY_HEADER {
            return Err(TagFilterError::registry_at_line(
                "header missing or incorrect",
                1,
            ));
        }

        let mut registry = TagRegistry::default();
        let mut line_no: u64 = 1;
        for line in lines {
            let line = line?;
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let tag = parse_line(&line, line_no)?;
            registry.insert(Arc::new(tag));
        }

        if registry.by_id.is_empty() {
            return Err(TagFilterError::registry("no tags registered"));
        }
        Ok(registry)
    }

    fn insert(&mut self, tag: TagRef) {
        if self.by_id.insert(tag.id, Arc::clone(&tag)).is_some() {
            warn!("tag {} registered more than once; keeping the last entry", tag.id);
            for group in self.groups.values_mut() {
                group.retain(|t| t.id != tag.id);
            }
        }
        let key = (tag.nominal_freq(), tag.coarse_code());
        self.freqs.insert(key.0);
        self.groups.entry(key).or_default().push(tag);
    }

    /// All (nominal frequency, coarse code) groups.
    pub fn groups(
        &self,
    ) -> impl Iterator<Item = (&(NominalFreqKhz, CoarseCode), &Vec<TagRef>)> {
        self.groups.iter()
    }

    pub fn group(&self, freq: NominalFreqKhz, code: CoarseCode) -> Option<&[TagRef]> {
        self.groups.get(&(freq, code)).map(Vec::as_slice)
    }

    /// Distinct nominal frequencies with at least one registered tag.
    pub fn nominal_freqs(&self) -> &BTreeSet<NominalFreqKhz> {
        &self.freqs
    }

    pub fn tag(&self, id: TagId) -> Option<&TagRef> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn parse_line(line: &str, line_no: u64) -> TagFilterResult<KnownTag> {
    let fields = split_quoted(line);
    if fields.len() != REGISTRY_FIELDS {
        return Err(TagFilterError::registry_at_line(
            format!("expected {REGISTRY_FIELDS} fields, found {}", fields.len()),
            line_no,
        ));
    }

    let id: u32 = fields[1].trim().parse().map_err(|_| {
        TagFilterError::registry_at_line(format!("bad tag id {:?}", fields[1]), line_no)
    })?;
    let freq_mhz: f64 = fields[2].trim().parse().map_err(|_| {
        TagFilterError::registry_at_line(format!("bad tag frequency {:?}", fields[2]), line_no)
    })?;
    let bi: f64 = fields[BI_FIELD].trim().parse().map_err(|_| {
        TagFilterError::registry_at_line(
            format!("bad burst interval {:?}", fields[BI_FIELD]),
            line_no,
        )
    })?;
    if !(bi > 0.0) {
        return Err(TagFilterError::registry_at_line(
            format!("burst interval must be positive, got {bi}"),
            line_no,
        ));
    }

    Ok(KnownTag::new(TagId(id), fields[0].clone(), freq_mhz, bi))
}
