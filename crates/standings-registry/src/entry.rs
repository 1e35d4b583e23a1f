//! Leaderboard entries.

use std::fmt;

/// Stable identity of an entry inside the registry arena.
///
/// Assigned at seed time (the 0-based seed ordinal) and never reused.
/// Re-ranking permutes the ordering, not the arena, so an id stays valid
/// for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EntryId(pub(crate) usize);

impl EntryId {
    /// Position of this entry in the arena.
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A ranked entity.
///
/// The key is fixed at creation. Score and rank only change inside the
/// registry, so callers see entries read-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    key: String,
    score: i32,
    rank: u32,
}

impl Entry {
    pub(crate) fn new(key: String, score: i32) -> Self {
        Self { key, score, rank: 0 }
    }

    /// Unique key, e.g. `user_42`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current score.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Competition rank (1 is best). Zero until the first re-rank.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub(crate) fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    pub(crate) fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

/// Key assigned to the entry created at the given 1-based seed ordinal.
pub fn seed_key(ordinal: usize) -> String {
    format!("user_{}", ordinal)
}
