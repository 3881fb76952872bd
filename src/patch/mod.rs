// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Line-granular forward patches between two snapshots of a page.
//!
//! A [`Patch`] is a list of [`Hunk`]s. Each hunk remembers where its first line sat in the
//! old text and the runs of text to keep, remove and insert at that point. Hunks carry a few
//! lines of unchanged context so that [`Patch::apply`] can still place them when the text it
//! is given has drifted from the one the patch was computed against.


use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

pub const DEFAULT_CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edit {
    Keep(String),
    Remove(String),
    Insert(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Byte offset of the hunk's first line in the old text.
    pub start: usize,
    pub edits: Vec<Edit>,
}

impl Hunk {
    /// Text the hunk expects to find: context plus removed runs.
    pub fn before(&self) -> String {
        self.edits
            .iter()
            .filter_map(|edit| match edit {
                Edit::Keep(s) | Edit::Remove(s) => Some(s.as_str()),
                Edit::Insert(_) => None,
            })
            .collect()
    }

    /// Text the hunk leaves behind: context plus inserted runs.
    pub fn after(&self) -> String {
        self.edits
            .iter()
            .filter_map(|edit| match edit {
                Edit::Keep(s) | Edit::Insert(s) => Some(s.as_str()),
                Edit::Remove(_) => None,
            })
            .collect()
    }

    fn push(&mut self, tag: ChangeTag, value: &str) {
        match (self.edits.last_mut(), tag) {
            (Some(Edit::Keep(run)), ChangeTag::Equal)
            | (Some(Edit::Remove(run)), ChangeTag::Delete)
            | (Some(Edit::Insert(run)), ChangeTag::Insert) => run.push_str(value),
            (_, ChangeTag::Equal) => self.edits.push(Edit::Keep(value.to_owned())),
            (_, ChangeTag::Delete) => self.edits.push(Edit::Remove(value.to_owned())),
            (_, ChangeTag::Insert) => self.edits.push(Edit::Insert(value.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub hunks: Vec<Hunk>,
}

/// Result of applying a patch: the patched text and, per hunk, whether it applied cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub hunks: Vec<bool>,
}

impl Applied {
    pub fn is_clean(&self) -> bool {
        self.hunks.iter().all(|ok| *ok)
    }

    /// Indices of hunks that could not be placed.
    pub fn failed(&self) -> impl Iterator<Item = usize> + '_ {
        self.hunks
            .iter()
            .enumerate()
            .filter_map(|(i, ok)| (!ok).then_some(i))
    }
}

impl Patch {
    /// Computes the patch turning `old` into `new`, keeping `context` unchanged lines around
    /// every change.
    pub fn diff(old: &str, new: &str, context: usize) -> Self {
        let diff = TextDiff::from_lines(old, new);

        // byte offset of every old line, indexed by line number
        let mut offsets = Vec::new();
        let mut offset = 0;
        for change in diff.iter_all_changes() {
            if change.tag() != ChangeTag::Insert {
                offsets.push(offset);
                offset += change.value().len();
            }
        }
        offsets.push(offset);

        let hunks = diff
            .grouped_ops(context)
            .iter()
            .filter_map(|group| {
                let first = group.first()?;
                let mut hunk = Hunk {
                    start: offsets[first.old_range().start],
                    edits: vec![],
                };
                for op in group {
                    for change in diff.iter_changes(op) {
                        hunk.push(change.tag(), change.value());
                    }
                }
                Some(hunk)
            })
            .collect();
        Self { hunks }
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Applies the patch to `base`.
    ///
    /// Every hunk is tried at its recorded offset, shifted by how far earlier hunks moved the
    /// text. When the expected text is not there, the closest exact occurrence is used instead.
    /// Hunks that cannot be placed at all are skipped and reported as failed.
    pub fn apply(&self, base: &str) -> Applied {
        let mut text = base.to_owned();
        let mut drift: isize = 0;
        let mut results = Vec::with_capacity(self.hunks.len());
        for hunk in &self.hunks {
            let before = hunk.before();
            let after = hunk.after();
            let expected = (hunk.start as isize + drift).max(0) as usize;
            match locate(&text, &before, expected) {
                Some(at) => {
                    text.replace_range(at..at + before.len(), &after);
                    drift = at as isize - hunk.start as isize + after.len() as isize
                        - before.len() as isize;
                    results.push(true);
                }
                None => results.push(false),
            }
        }
        Applied {
            text,
            hunks: results,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Finds where `needle` should be spliced into `text`, preferring `expected`.
fn locate(text: &str, needle: &str, expected: usize) -> Option<usize> {
    if needle.is_empty() {
        let at = expected.min(text.len());
        return text.is_char_boundary(at).then_some(at);
    }
    if text.get(expected..expected + needle.len()) == Some(needle) {
        return Some(expected);
    }
    text.match_indices(needle)
        .map(|(at, _)| at)
        .min_by_key(|at| at.abs_diff(expected))
}
