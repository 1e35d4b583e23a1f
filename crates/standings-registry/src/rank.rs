//! Competition ranking.
//!
//! Entries are ordered by score, highest first. Equal scores share a rank and
//! the next lower score is ranked by its position, so scores
//! `[90, 90, 50]` rank as `[1, 1, 3]`.

use std::cmp::Reverse;

use crate::entry::{Entry, EntryId};

/// Competition ranks for scores that are already sorted descending.
pub fn competition_ranks(sorted_scores: &[i32]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(sorted_scores.len());
    let mut rank = 1;
    for (pos, score) in sorted_scores.iter().enumerate() {
        if pos > 0 && *score < sorted_scores[pos - 1] {
            rank = position_rank(pos);
        }
        ranks.push(rank);
    }
    ranks
}

/// Rank of the 0-based position `pos` when it follows a lower score.
///
/// Saturates at `u32::MAX` for populations beyond that size.
fn position_rank(pos: usize) -> u32 {
    u32::try_from(pos + 1).unwrap_or(u32::MAX)
}

/// Sort `order` by descending score and write ranks back into `entries`.
///
/// The sort is stable: ids with equal scores keep their relative order.
pub(crate) fn rerank(entries: &mut [Entry], order: &mut [EntryId]) {
    order.sort_by_key(|id| Reverse(entries[id.index()].score()));

    let mut rank = 1;
    let mut prev = None;
    for (pos, id) in order.iter().enumerate() {
        let entry = &mut entries[id.index()];
        if prev.is_some_and(|p| entry.score() < p) {
            rank = position_rank(pos);
        }
        entry.set_rank(rank);
        prev = Some(entry.score());
    }
}
