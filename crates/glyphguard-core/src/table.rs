//! Confusable lookup table.
//!
//! Entries map a pattern (one or more code points in NFD) to the canonical
//! sequence it imitates. The built-in table is compiled from
//! `assets/data/confusables.txt` by `build.rs`; smaller tables can be built
//! from any list of entries with [`ConfusableTable::from_entries`].

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

// Include generated confusable table
include!(concat!(env!("OUT_DIR"), "/confusables_gen.rs"));

static BUILTIN: Lazy<ConfusableTable> = Lazy::new(|| {
    let entries = CONFUSABLE_TABLE
        .iter()
        .map(|&(src, tgt)| ConfusableEntry::new(src, tgt));
    ConfusableTable::from_entries(entries)
        .unwrap_or_else(|e| panic!("embedded confusables table is invalid: {e}"))
});

/// One row of the table: `pattern` looks like `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfusableEntry {
    pub pattern: Vec<char>,
    pub replacement: Vec<char>,
}

impl ConfusableEntry {
    pub fn new(pattern: impl Into<Vec<char>>, replacement: impl Into<Vec<char>>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Build an entry from the characters of two strings, taken as-is.
    pub fn from_strs(pattern: &str, replacement: &str) -> Self {
        Self::new(
            pattern.chars().collect::<Vec<_>>(),
            replacement.chars().collect::<Vec<_>>(),
        )
    }
}

/// A pattern found at the start of some input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    pub pattern: &'t [char],
    pub replacement: &'t [char],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("confusable entry has an empty pattern")]
    EmptyPattern,

    #[error("confusable entry for {} has an empty replacement", format_seq(.pattern))]
    EmptyReplacement { pattern: Vec<char> },

    #[error("pattern {} is listed more than once", format_seq(.pattern))]
    DuplicatePattern { pattern: Vec<char> },

    #[error("replacement for {} does not remove any code point of its pattern", format_seq(.pattern))]
    NoProgress { pattern: Vec<char> },

    #[error("substitution cycle through {}", format_seq(std::slice::from_ref(.code_point)))]
    Cycle { code_point: char },
}

/// Render a code point sequence as `U+0131 U+0307`.
pub(crate) fn format_seq(seq: &[char]) -> String {
    seq.iter()
        .map(|c| format!("U+{:04X}", *c as u32))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Immutable longest-match lookup over confusable entries.
#[derive(Debug, Clone)]
pub struct ConfusableTable {
    entries: Vec<ConfusableEntry>,
    /// Entry indices keyed by first pattern code point, longest pattern first.
    by_first: HashMap<char, Vec<usize>>,
    max_pattern_len: usize,
    closed: bool,
}

impl ConfusableTable {
    /// The table compiled into the crate. Built on first use.
    pub fn builtin() -> &'static ConfusableTable {
        &BUILTIN
    }

    /// Validate `entries` and build the lookup structures.
    ///
    /// Patterns must be non-empty and unique. A pattern that is not in NFD
    /// can never occur in decomposed input, so its entry is skipped.
    /// Replacements are stored decomposed. A table whose substitutions could rewrite forever
    /// is rejected with [`TableError::NoProgress`] or [`TableError::Cycle`],
    /// which is what makes iterating substitutions to a fixed point terminate.
    pub fn from_entries(
        entries: impl IntoIterator<Item = ConfusableEntry>,
    ) -> Result<Self, TableError> {
        let mut stored: Vec<ConfusableEntry> = Vec::new();
        let mut seen: HashSet<Vec<char>> = HashSet::new();
        let mut skipped = 0usize;

        for entry in entries {
            if entry.pattern.is_empty() {
                return Err(TableError::EmptyPattern);
            }
            if entry.replacement.is_empty() {
                return Err(TableError::EmptyReplacement {
                    pattern: entry.pattern,
                });
            }
            if !is_nfd(&entry.pattern) {
                tracing::debug!(
                    target: "glyphguard::table",
                    pattern = %format_seq(&entry.pattern),
                    "skipping confusable entry not in NFD"
                );
                skipped += 1;
                continue;
            }
            if !seen.insert(entry.pattern.clone()) {
                return Err(TableError::DuplicatePattern {
                    pattern: entry.pattern,
                });
            }
            let replacement: Vec<char> = entry.replacement.into_iter().nfd().collect();
            stored.push(ConfusableEntry {
                pattern: entry.pattern,
                replacement,
            });
        }

        check_terminating(&stored)?;

        let mut by_first: HashMap<char, Vec<usize>> = HashMap::new();
        for (idx, entry) in stored.iter().enumerate() {
            by_first.entry(entry.pattern[0]).or_default().push(idx);
        }
        for candidates in by_first.values_mut() {
            candidates.sort_by(|&a, &b| stored[b].pattern.len().cmp(&stored[a].pattern.len()));
        }

        let max_pattern_len = stored.iter().map(|e| e.pattern.len()).max().unwrap_or(0);
        let closed = is_closed(&stored);

        tracing::debug!(
            target: "glyphguard::table",
            entries = stored.len(),
            skipped,
            max_pattern_len,
            closed,
            "confusable table built"
        );

        Ok(Self {
            entries: stored,
            by_first,
            max_pattern_len,
            closed,
        })
    }

    /// A copy of this table with `extra` merged in. An extra entry with the
    /// same pattern as an existing one replaces it.
    pub fn extended(
        &self,
        extra: impl IntoIterator<Item = ConfusableEntry>,
    ) -> Result<Self, TableError> {
        let extra: Vec<ConfusableEntry> = extra.into_iter().collect();
        let overridden: HashSet<&[char]> = extra.iter().map(|e| e.pattern.as_slice()).collect();

        let merged: Vec<ConfusableEntry> = self
            .entries
            .iter()
            .filter(|e| !overridden.contains(e.pattern.as_slice()))
            .chain(extra.iter())
            .cloned()
            .collect();

        tracing::debug!(
            target: "glyphguard::table",
            base = self.entries.len(),
            added = extra.len(),
            "extending confusable table"
        );

        Self::from_entries(merged)
    }

    /// Longest pattern that is a prefix of `input`, if any.
    pub fn longest_match(&self, input: &[char]) -> Option<Match<'_>> {
        let first = input.first()?;
        self.by_first
            .get(first)?
            .iter()
            .map(|&idx| &self.entries[idx])
            .find(|entry| input.starts_with(&entry.pattern))
            .map(|entry| Match {
                pattern: &entry.pattern,
                replacement: &entry.replacement,
            })
    }

    /// Replacement registered for exactly `pattern`.
    pub fn replacement_for(&self, pattern: &[char]) -> Option<&[char]> {
        let first = pattern.first()?;
        self.by_first
            .get(first)?
            .iter()
            .map(|&idx| &self.entries[idx])
            .find(|entry| entry.pattern == pattern)
            .map(|entry| entry.replacement.as_slice())
    }

    /// Check if a single character is itself a pattern.
    pub fn contains_char(&self, ch: char) -> bool {
        self.replacement_for(&[ch]).is_some()
    }

    /// True when one substitution pass always reaches the fixed point: no
    /// replacement code point occurs in any pattern, and every replacement
    /// code point is a starter so re-decomposition cannot reorder marks.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn max_pattern_len(&self) -> usize {
        self.max_pattern_len
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfusableEntry> {
        self.entries.iter()
    }
}

fn is_nfd(seq: &[char]) -> bool {
    seq.iter().copied().nfd().eq(seq.iter().copied())
}

fn is_closed(entries: &[ConfusableEntry]) -> bool {
    let pattern_chars: HashSet<char> = entries
        .iter()
        .flat_map(|e| e.pattern.iter().copied())
        .collect();
    entries
        .iter()
        .flat_map(|e| e.replacement.iter().copied())
        .all(|c| !pattern_chars.contains(&c) && canonical_combining_class(c) == 0)
}

/// Reject tables whose substitutions could rewrite forever.
///
/// For each entry, the code points it removes (pattern minus replacement,
/// as multisets) get an edge to the code points it adds. An entry that
/// removes nothing is rejected outright. With no cycle among the edges,
/// every firing substitution lowers the multiset of code point ranks, so
/// repeated passes must stop.
fn check_terminating(entries: &[ConfusableEntry]) -> Result<(), TableError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut edges: HashMap<char, Vec<char>> = HashMap::new();
    for entry in entries {
        let removed = multiset_difference(&entry.pattern, &entry.replacement);
        if removed.is_empty() {
            return Err(TableError::NoProgress {
                pattern: entry.pattern.clone(),
            });
        }
        let added = multiset_difference(&entry.replacement, &entry.pattern);
        for from in removed {
            edges.entry(from).or_default().extend(added.iter().copied());
        }
    }

    // Sorted roots keep the reported code point stable across runs.
    let mut roots: Vec<char> = edges.keys().copied().collect();
    roots.sort_unstable();

    let mut marks: HashMap<char, Mark> = HashMap::new();
    for root in roots {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        let mut stack: Vec<(char, usize)> = vec![(root, 0)];

        while let Some(&(node, next)) = stack.last() {
            let children = edges.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            match children.get(next) {
                Some(&child) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    match marks.get(&child) {
                        Some(Mark::Visiting) => {
                            return Err(TableError::Cycle { code_point: child });
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(child, Mark::Visiting);
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}

/// Code points of `a` left after removing one occurrence per code point of `b`.
fn multiset_difference(a: &[char], b: &[char]) -> Vec<char> {
    let mut rest = b.to_vec();
    a.iter()
        .copied()
        .filter(|c| match rest.iter().position(|r| r == c) {
            Some(i) => {
                rest.swap_remove(i);
                false
            }
            None => true,
        })
        .collect()
}
