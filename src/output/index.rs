//! In-memory index of clips already present in the output tree

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::model::{ClipRecord, Label};
use crate::error::{ClipBatchError, ClipBatchResult};
use crate::output::filename::ClipFilenameCodec;
use crate::output::OutputLayout;

/// Per-label clip records, rebuilt from disk at the start of every run and
/// updated in memory as clips are created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingClipIndex {
    records: BTreeMap<Label, Vec<ClipRecord>>,
}

/// Per-label summary for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub label: Label,
    pub clips: usize,
    pub highest_sequence: Option<u32>,
    pub next_sequence: Option<u32>,
}

impl ExistingClipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every label's video directory and decode the clip filenames found.
    ///
    /// A label directory that does not exist yet contributes no records.
    /// Files that do not follow the naming scheme are ignored.
    pub fn rebuild(layout: &OutputLayout) -> ClipBatchResult<Self> {
        let mut index = Self::new();

        for label in Label::ALL {
            let dir = layout.video_dir(label);
            if !dir.exists() {
                debug!(label = %label, dir = %dir.display(), "No clip directory yet");
                continue;
            }

            for entry in walkdir::WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| ClipBatchError::OutputTreeUnreadable {
                    path: dir.display().to_string(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let name = entry.file_name().to_string_lossy();
                match ClipFilenameCodec::decode(&name) {
                    // A file in funny/ named n_... still counts for the directory's label
                    Some(record) => index.insert(ClipRecord { label, ..record }),
                    None => debug!(file = %name, "Ignoring non-clip file"),
                }
            }
        }

        debug!(
            funny = index.records(Label::Funny).len(),
            normal = index.records(Label::Normal).len(),
            "Rebuilt clip index"
        );
        Ok(index)
    }

    /// Records for a label, in insertion order
    pub fn records(&self, label: Label) -> &[ClipRecord] {
        self.records.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add a record; call right after a clip has been produced
    pub fn insert(&mut self, record: ClipRecord) {
        self.records.entry(record.label).or_default().push(record);
    }

    /// `1` for an empty label, otherwise one past the highest number seen.
    /// Gaps left by deleted clips are never filled.
    ///
    /// `None` once the label holds `u32::MAX`; numbers are never wrapped.
    pub fn next_sequence_number(&self, label: Label) -> Option<u32> {
        match self.highest_sequence_number(label) {
            Some(highest) => highest.checked_add(1),
            None => Some(1),
        }
    }

    pub fn highest_sequence_number(&self, label: Label) -> Option<u32> {
        self.records(label)
            .iter()
            .map(|record| record.sequence_number)
            .max()
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> Vec<LabelSummary> {
        Label::ALL
            .iter()
            .map(|&label| LabelSummary {
                label,
                clips: self.records(label).len(),
                highest_sequence: self.highest_sequence_number(label),
                next_sequence: self.next_sequence_number(label),
            })
            .collect()
    }
}
