//! Skeleton computation: decomposition plus confusable substitution.
//!
//! Two strings are visually confusable when their skeletons are equal.

use unicode_normalization::UnicodeNormalization;

use crate::table::ConfusableTable;

/// One substitution made during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution<'t> {
    /// Code point index of the match in the pass input.
    pub offset: usize,
    pub pattern: &'t [char],
    pub replacement: &'t [char],
}

/// Result of a single left-to-right substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass<'t> {
    pub output: Vec<char>,
    pub substitutions: Vec<Substitution<'t>>,
}

impl Pass<'_> {
    /// Whether any substitution fired.
    pub fn fired(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

/// Computes skeletons against a borrowed confusable table.
#[derive(Debug, Clone, Copy)]
pub struct Skeletonizer<'t> {
    table: &'t ConfusableTable,
}

impl Skeletonizer<'static> {
    pub fn builtin() -> Self {
        Self::new(ConfusableTable::builtin())
    }
}

impl<'t> Skeletonizer<'t> {
    pub fn new(table: &'t ConfusableTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t ConfusableTable {
        self.table
    }

    /// Scan `input` once, replacing the longest pattern at each position.
    /// Unmatched code points are copied through.
    ///
    /// `input` is expected to be in NFD already; patterns are authored
    /// against decomposed text.
    pub fn substitute_once(&self, input: &[char]) -> Pass<'t> {
        let mut output = Vec::with_capacity(input.len());
        let mut substitutions = Vec::new();
        let mut i = 0;

        while i < input.len() {
            match self.table.longest_match(&input[i..]) {
                Some(m) => {
                    output.extend_from_slice(m.replacement);
                    substitutions.push(Substitution {
                        offset: i,
                        pattern: m.pattern,
                        replacement: m.replacement,
                    });
                    i += m.pattern.len();
                }
                None => {
                    output.push(input[i]);
                    i += 1;
                }
            }
        }

        Pass {
            output,
            substitutions,
        }
    }

    /// Skeleton of a code point sequence.
    ///
    /// The input is decomposed, then substituted and re-decomposed until a
    /// pass fires nothing. A closed table reaches that point after one pass,
    /// so the verification pass is skipped. The result is always in NFD.
    pub fn skeleton_chars(&self, input: &[char]) -> Vec<char> {
        let mut current: Vec<char> = input.iter().copied().nfd().collect();
        loop {
            let pass = self.substitute_once(&current);
            if !pass.fired() {
                return current;
            }
            current = pass.output.into_iter().nfd().collect();
            if self.table.is_closed() {
                return current;
            }
        }
    }

    /// Skeleton of a string.
    pub fn normalize(&self, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        self.skeleton_chars(&chars).into_iter().collect()
    }

    /// Check if two strings have the same skeleton. Case is significant.
    pub fn are_confusable(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ConfusableEntry;

    fn table(entries: &[(&str, &str)]) -> ConfusableTable {
        ConfusableTable::from_entries(
            entries
                .iter()
                .map(|(p, r)| ConfusableEntry::from_strs(p, r)),
        )
        .unwrap()
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_skeleton() {
        // Cyrillic "а" looks like Latin "a"
        assert_eq!(Skeletonizer::builtin().normalize("\u{0430}"), "a");
    }

    #[test]
    fn test_confusable_domain() {
        // "gіthub.com" with Cyrillic і
        assert!(Skeletonizer::builtin().are_confusable("g\u{0456}thub.com", "github.com"));
    }

    #[test]
    fn test_case_is_kept() {
        assert!(!Skeletonizer::builtin().are_confusable("Github", "github"));
    }

    #[test]
    fn test_empty_input() {
        let s = Skeletonizer::builtin();
        assert_eq!(s.normalize(""), "");
        assert!(!s.substitute_once(&[]).fired());
    }

    #[test]
    fn test_pass_records_offsets() {
        let t = table(&[("x", "a"), ("yz", "b")]);
        let pass = Skeletonizer::new(&t).substitute_once(&chars("qxyzx"));
        assert_eq!(pass.output, chars("qaba"));
        let offsets: Vec<usize> = pass.substitutions.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![1, 2, 4]);
        assert_eq!(pass.substitutions[1].pattern, &['y', 'z']);
    }

    #[test]
    fn test_pass_skips_matched_span() {
        // After "yz" is consumed, the "z" pattern must not fire on its tail.
        let t = table(&[("yz", "b"), ("z", "c")]);
        let pass = Skeletonizer::new(&t).substitute_once(&chars("yzz"));
        assert_eq!(pass.output, chars("bc"));
        assert_eq!(pass.substitutions.len(), 2);
    }

    #[test]
    fn test_closed_table_single_pass() {
        let t = table(&[("x", "a")]);
        assert!(t.is_closed());
        assert_eq!(Skeletonizer::new(&t).normalize("xox"), "aoa");
    }

    #[test]
    fn test_chain_iterates_to_fixpoint() {
        let t = table(&[("x", "y"), ("y", "z")]);
        assert!(!t.is_closed());
        let s = Skeletonizer::new(&t);
        // One pass gives "yz"; the fixed point is "zz".
        assert_eq!(s.substitute_once(&chars("xy")).output, chars("yz"));
        assert_eq!(s.normalize("xy"), "zz");
    }

    #[test]
    fn test_replacement_forms_multi_char_pattern() {
        // "p" becomes "q", which then completes the "qr" pattern.
        let t = table(&[("p", "q"), ("qr", "s")]);
        let s = Skeletonizer::new(&t);
        assert_eq!(s.normalize("pr"), "s");
        assert_eq!(s.normalize(&s.normalize("pr")), "s");
    }

    #[test]
    fn test_precomposed_replacement_redecomposed() {
        // The replacement is stored and emitted decomposed.
        let t = table(&[("x", "\u{00E9}")]);
        let s = Skeletonizer::new(&t);
        assert_eq!(s.normalize("x"), "e\u{0301}");
        assert_eq!(s.normalize("x"), s.normalize("\u{00E9}"));
    }

    #[test]
    fn test_mark_reordering_reaches_fixpoint() {
        // The replacement carries a below mark (ccc 220) that NFD moves in
        // front of the above mark (ccc 230), making "o" + below mark adjacent.
        let t = table(&[("x", "\u{0323}"), ("o\u{0323}", "0")]);
        assert!(!t.is_closed());
        let s = Skeletonizer::new(&t);
        let out = s.normalize("o\u{0301}x");
        assert_eq!(out, "0\u{0301}");
        assert_eq!(s.normalize(&out), out);
    }

    #[test]
    fn test_longest_match_sequence() {
        let s = Skeletonizer::builtin();
        // Dotless i with a combining dot above looks like a plain i.
        assert_eq!(s.normalize("\u{0131}\u{0307}"), "i");
        assert_eq!(s.normalize("\u{0131}"), "i");
    }

    #[test]
    fn test_fullwidth_and_math() {
        let s = Skeletonizer::builtin();
        assert_eq!(s.normalize("\u{FF41}\u{FF44}\u{FF4D}\u{FF49}\u{FF4E}"), "admin");
        assert_eq!(s.normalize("\u{1D41A}\u{1D41D}\u{1D426}\u{1D422}\u{1D427}"), "admin");
    }
}
