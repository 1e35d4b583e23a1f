//! Standings Registry
//!
//! An in-memory leaderboard: a fixed set of keyed entries, each with a score
//! and a competition rank, kept sorted by score.
//!
//! # Model
//!
//! - **Entries** are created once by [`Registry::seed`] and never added or
//!   removed afterwards. Keys are immutable; only scores and ranks change.
//! - **Ranking** is competition style: equal scores share a rank and the next
//!   lower score takes its 1-based position (`[90, 90, 50]` → `[1, 1, 3]`).
//! - **Writes** ([`Registry::seed`], [`Registry::bulk_rerate`]) always end with
//!   a full re-rank, so a completed write leaves the registry sorted.
//!
//! # Concurrency
//!
//! The registry itself holds no lock. Share it behind a single reader/writer
//! lock: reads (`top`, `search`, `get`, `stats`) take `&self` and can run
//! together, writes take `&mut self` and run alone. Readers therefore never
//! see a write halfway through its re-rank.
//!
//! # Example
//!
//! ```
//! use standings_registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.seed(1000, 100, 5000)?;
//!
//! let leaders = registry.top(10)?;
//! assert_eq!(leaders.len(), 10);
//! assert_eq!(leaders[0].rank(), 1);
//!
//! registry.bulk_rerate(200, 100, 5000)?;
//! assert_eq!(registry.search("user_99")?.len(), 11);
//! # Ok::<(), standings_registry::Error>(())
//! ```

mod entry;
mod error;
mod rank;
mod registry;

pub use entry::{seed_key, Entry};
pub use error::{Error, Result};
pub use rank::competition_ranks;
pub use registry::{Registry, Stats};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, RwLock};
    use std::thread;

    #[test]
    fn uniform_scores_share_first_rank() {
        let mut registry = Registry::new();
        registry.seed(5, 100, 100).unwrap();

        let entries = registry.top(5).unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.score() == 100 && e.rank() == 1));
    }

    #[test]
    fn fixed_scores_rank_with_gap() {
        let registry =
            Registry::from_scores([("user_1", 50), ("user_2", 90), ("user_3", 90)]).unwrap();

        let view: Vec<(&str, i32, u32)> = registry
            .top(3)
            .unwrap()
            .into_iter()
            .map(|e| (e.key(), e.score(), e.rank()))
            .collect();
        assert_eq!(
            view,
            vec![("user_2", 90, 1), ("user_3", 90, 1), ("user_1", 50, 3)]
        );
    }

    #[test]
    fn top_two_of_ten() {
        let mut registry = Registry::new();
        registry
            .seed_with_rng(&mut StdRng::seed_from_u64(42), 10, 1, 1000)
            .unwrap();

        let top = registry.top(2).unwrap();
        assert_eq!(top.len(), 2);
        assert!(top[0].score() >= top[1].score());

        let best = registry.iter().map(Entry::score).max().unwrap();
        assert_eq!(top[0].score(), best);
    }

    #[test]
    fn empty_rerate_still_reranks() {
        let mut registry =
            Registry::from_scores([("a", 3), ("b", 3), ("c", 9), ("d", 1)]).unwrap();
        let before: Vec<(String, u32)> = registry
            .iter()
            .map(|e| (e.key().to_string(), e.rank()))
            .collect();

        registry.bulk_rerate(0, 1, 10).unwrap();

        let after: Vec<(String, u32)> = registry
            .iter()
            .map(|e| (e.key().to_string(), e.rank()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(registry.generation(), 2);
    }

    #[test]
    fn search_without_match_is_empty() {
        let mut registry = Registry::new();
        registry.seed(100, 100, 5000).unwrap();
        assert!(registry.search("zzz_nonexistent").unwrap().is_empty());
    }

    #[test]
    fn readers_never_see_partial_rerank() {
        let mut registry = Registry::new();
        registry
            .seed_with_rng(&mut StdRng::seed_from_u64(7), 2_000, 100, 5000)
            .unwrap();
        let shared = Arc::new(RwLock::new(registry));

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(100 + w);
                    for _ in 0..25 {
                        let mut registry = shared.write().unwrap();
                        registry.bulk_rerate_with_rng(&mut rng, 200, 100, 5000).unwrap();
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|r| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for i in 0..50 {
                        let registry = shared.read().unwrap();
                        let entries = if (i + r) % 2 == 0 {
                            registry.top(500).unwrap()
                        } else {
                            registry.search("user_1").unwrap()
                        };
                        for pair in entries.windows(2) {
                            assert!(pair[0].score() >= pair[1].score());
                        }
                        let scores: Vec<i32> = registry.iter().map(Entry::score).collect();
                        let ranks: Vec<u32> = registry.iter().map(Entry::rank).collect();
                        assert_eq!(ranks, competition_ranks(&scores));
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        let registry = shared.read().unwrap();
        assert_eq!(registry.generation(), 1 + 4 * 25);
        registry.check_invariants().unwrap();
    }
}
