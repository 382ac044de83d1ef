use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::skeleton::Skeletonizer;

/// A confusable sequence found in the decomposed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Homoglyph {
    /// Code point index in the NFD form of the input.
    pub offset: usize,
    pub source: String,
    pub replacement: String,
}

impl Skeletonizer<'_> {
    /// Check if any confusable pattern fires on the decomposed input.
    ///
    /// Diacritics with no table entry decompose but never count.
    pub fn contains_homoglyphs(&self, input: &str) -> bool {
        let decomposed: Vec<char> = input.nfd().collect();
        self.substitute_once(&decomposed).fired()
    }

    /// Every substitution made by a single pass over the decomposed input.
    pub fn find_homoglyphs(&self, input: &str) -> Vec<Homoglyph> {
        let decomposed: Vec<char> = input.nfd().collect();
        self.substitute_once(&decomposed)
            .substitutions
            .into_iter()
            .map(|sub| Homoglyph {
                offset: sub.offset,
                source: sub.pattern.iter().collect(),
                replacement: sub.replacement.iter().collect(),
            })
            .collect()
    }
}
