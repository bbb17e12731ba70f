//! Ringside commentary lookup

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentaryCategory {
    Start,
    Hit,
    Critical,
    Miss,
    Special,
    Win,
}

/// Produces a display line for an outcome
///
/// Implementations must be pure: the same category and index always give the
/// same line.
pub trait Commentary: Send + Sync {
    fn line(&self, category: CommentaryCategory, index: usize) -> String;
}

/// Built-in lines, picked round-robin by index
#[derive(Debug, Clone, Default)]
pub struct CommentaryTable;

const START: &[&str] = &[
    "Bets are closed, feathers are up!",
    "Two gladiators step into the pit!",
    "Only one walks out of here tonight!",
];
const HIT: &[&str] = &[
    "Beak right on the chin!",
    "A wing strike that rattles the stands!",
    "Came down like a sledgehammer!",
    "Feathers everywhere!",
    "You could hear that one from the street!",
];
const CRITICAL: &[&str] = &[
    "CRITICAL HIT! Lights out!",
    "That one goes in the history books!",
    "DEVASTATION!",
];
const MISS: &[&str] = &[
    "Felt the wind, found nothing!",
    "Wide! Missed the mark.",
    "Slipped away like a dancer!",
];
const SPECIAL: &[&str] = &[
    "Unleashed the beast within!",
    "Fire in those eyes!",
];
const WIN: &[&str] = &[
    "And we have a winner!",
    "Roaring with victory!",
    "This pit belongs to them now!",
];
const FALLBACK: &str = "The crowd is on its feet!";

impl Commentary for CommentaryTable {
    fn line(&self, category: CommentaryCategory, index: usize) -> String {
        let lines = match category {
            CommentaryCategory::Start => START,
            CommentaryCategory::Hit => HIT,
            CommentaryCategory::Critical => CRITICAL,
            CommentaryCategory::Miss => MISS,
            CommentaryCategory::Special => SPECIAL,
            CommentaryCategory::Win => WIN,
        };
        lines
            .get(index % lines.len().max(1))
            .copied()
            .unwrap_or(FALLBACK)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_deterministic() {
        let table = CommentaryTable;
        assert_eq!(
            table.line(CommentaryCategory::Hit, 3),
            table.line(CommentaryCategory::Hit, 3)
        );
    }

    #[test]
    fn test_index_wraps() {
        let table = CommentaryTable;
        assert_eq!(
            table.line(CommentaryCategory::Miss, 0),
            table.line(CommentaryCategory::Miss, MISS.len())
        );
    }

    #[test]
    fn test_every_category_has_text() {
        let table = CommentaryTable;
        for category in [
            CommentaryCategory::Start,
            CommentaryCategory::Hit,
            CommentaryCategory::Critical,
            CommentaryCategory::Miss,
            CommentaryCategory::Special,
            CommentaryCategory::Win,
        ] {
            assert!(!table.line(category, 7).is_empty());
        }
    }
}
