//! Confusable-character skeletons and homoglyph detection.
//!
//! The free functions use the built-in table. Build a [`Skeletonizer`] over
//! your own [`ConfusableTable`] to use a different one.

pub mod config;
pub mod detect;
pub mod skeleton;
pub mod table;

pub use config::{Config, ConfigError, ExtraConfusable};
pub use detect::Homoglyph;
pub use skeleton::{Pass, Skeletonizer, Substitution};
pub use table::{ConfusableEntry, ConfusableTable, Match, TableError};

/// Skeleton of `input`: equal skeletons mean visually confusable strings.
pub fn normalize(input: &str) -> String {
    Skeletonizer::builtin().normalize(input)
}

/// Check if `input` contains any character with a confusable twin.
pub fn contains_homoglyphs(input: &str) -> bool {
    Skeletonizer::builtin().contains_homoglyphs(input)
}

/// Confusable sequences found in `input`, in order.
pub fn find_homoglyphs(input: &str) -> Vec<Homoglyph> {
    Skeletonizer::builtin().find_homoglyphs(input)
}

/// Check if two strings are confusable (their skeletons match).
pub fn are_confusable(a: &str, b: &str) -> bool {
    Skeletonizer::builtin().are_confusable(a, b)
}
