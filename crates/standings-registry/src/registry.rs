//! The ranked registry.
//!
//! Entries live in an arena indexed by `EntryId` and never move. Ranking
//! order is a separate vector of ids, so re-ranking permutes ids and the
//! key map built at seed time never goes stale.
//!
//! Read operations take `&self` and writes take `&mut self`. Wrapped in a
//! reader/writer lock, a reader can only ever see the state left by a
//! completed write, including its re-rank.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::entry::{seed_key, Entry, EntryId};
use crate::error::{check_range, Error, Result};
use crate::rank::{self, competition_ranks};

/// Summary of the current registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of entries.
    pub population: usize,
    /// Highest score, if any entries exist.
    pub top_score: Option<i32>,
    /// Lowest score, if any entries exist.
    pub bottom_score: Option<i32>,
    /// Number of distinct ranks (equal to distinct scores).
    pub distinct_ranks: usize,
    /// Completed write transactions. Seeding counts as the first.
    pub generation: u64,
}

/// In-memory leaderboard of ranked entries.
#[derive(Debug, Default)]
pub struct Registry {
    /// Arena, in seed order.
    entries: Vec<Entry>,
    /// Ids sorted by score descending.
    order: Vec<EntryId>,
    /// Key to arena id.
    index: HashMap<String, EntryId>,
    seeded: bool,
    generation: u64,
}

impl Registry {
    /// Create an unseeded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a seeded registry from explicit `(key, score)` pairs.
    ///
    /// Entries keep the given order as their seed order, which is also the
    /// tie order after the initial re-rank.
    pub fn from_scores<I, K>(scores: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, i32)>,
        K: Into<String>,
    {
        let mut registry = Self::new();
        for (key, score) in scores {
            registry.insert(key.into(), score)?;
        }
        registry.finish_seed();
        Ok(registry)
    }

    /// Populate `n` entries with random scores in `[score_min, score_max]`.
    ///
    /// Keys are `user_1` through `user_<n>`. Must be called exactly once,
    /// before any other operation.
    pub fn seed(&mut self, n: usize, score_min: i32, score_max: i32) -> Result<()> {
        self.seed_with_rng(&mut rand::thread_rng(), n, score_min, score_max)
    }

    /// [`Registry::seed`] driven by a caller-supplied RNG.
    pub fn seed_with_rng<R: Rng>(
        &mut self,
        rng: &mut R,
        n: usize,
        score_min: i32,
        score_max: i32,
    ) -> Result<()> {
        if self.seeded {
            return Err(Error::AlreadySeeded);
        }
        check_range(score_min, score_max)?;

        let started = Instant::now();
        self.entries.reserve(n);
        self.order.reserve(n);
        self.index.reserve(n);
        for ordinal in 1..=n {
            let score = rng.gen_range(score_min..=score_max);
            self.insert(seed_key(ordinal), score)?;
        }
        self.finish_seed();

        info!(
            population = n,
            score_min,
            score_max,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Registry seeded"
        );
        Ok(())
    }

    fn insert(&mut self, key: String, score: i32) -> Result<()> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey(key));
        }
        let id = EntryId(self.entries.len());
        self.index.insert(key.clone(), id);
        self.entries.push(Entry::new(key, score));
        self.order.push(id);
        Ok(())
    }

    fn finish_seed(&mut self) {
        self.seeded = true;
        self.apply_rerank();
        self.generation = 1;
    }

    /// Whether seeding has completed.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Completed write transactions.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.order.iter().map(move |id| &self.entries[id.index()])
    }

    /// The first `k` entries in rank order.
    ///
    /// Returns fewer than `k` entries if the population is smaller.
    pub fn top(&self, k: usize) -> Result<Vec<&Entry>> {
        self.ensure_seeded()?;
        Ok(self.iter().take(k).collect())
    }

    /// Every entry whose key contains `substring`, ignoring case, in rank order.
    ///
    /// An empty substring matches every entry.
    pub fn search(&self, substring: &str) -> Result<Vec<&Entry>> {
        self.ensure_seeded()?;
        if substring.is_empty() {
            return Ok(self.iter().collect());
        }
        let needle = substring.to_lowercase();
        Ok(self
            .iter()
            .filter(|entry| entry.key().to_lowercase().contains(&needle))
            .collect())
    }

    /// Look up an entry by exact key.
    pub fn get(&self, key: &str) -> Result<Option<&Entry>> {
        self.ensure_seeded()?;
        Ok(self.index.get(key).map(|id| &self.entries[id.index()]))
    }

    /// Assign new random scores to `count` entries, then re-rank once.
    ///
    /// Entries are drawn uniformly with replacement, so one entry can be
    /// overwritten several times in a call; the last draw wins.
    pub fn bulk_rerate(&mut self, count: usize, score_min: i32, score_max: i32) -> Result<()> {
        self.bulk_rerate_with_rng(&mut rand::thread_rng(), count, score_min, score_max)
    }

    /// [`Registry::bulk_rerate`] driven by a caller-supplied RNG.
    pub fn bulk_rerate_with_rng<R: Rng>(
        &mut self,
        rng: &mut R,
        count: usize,
        score_min: i32,
        score_max: i32,
    ) -> Result<()> {
        self.ensure_seeded()?;
        check_range(score_min, score_max)?;

        let started = Instant::now();
        let population = self.entries.len();
        if population > 0 {
            for _ in 0..count {
                let idx = rng.gen_range(0..population);
                let score = rng.gen_range(score_min..=score_max);
                self.entries[idx].set_score(score);
            }
        }
        self.apply_rerank();
        self.generation += 1;

        debug!(
            count,
            population,
            generation = self.generation,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Bulk re-rate applied"
        );
        Ok(())
    }

    /// Re-sort by score descending and recompute ranks.
    ///
    /// Every write already ends with a re-rank, so this is only useful to
    /// check that ranking is stable. Equal scores keep their previous
    /// relative order, so calling it twice changes nothing.
    pub fn rerank(&mut self) -> Result<()> {
        self.ensure_seeded()?;
        self.apply_rerank();
        Ok(())
    }

    fn apply_rerank(&mut self) {
        rank::rerank(&mut self.entries, &mut self.order);
        debug_assert!(self.check_invariants().is_ok());
    }

    /// Summary of the current state.
    pub fn stats(&self) -> Result<Stats> {
        self.ensure_seeded()?;
        let distinct_ranks = self
            .iter()
            .zip(self.iter().skip(1))
            .filter(|(a, b)| a.score() != b.score())
            .count()
            + usize::from(!self.is_empty());
        Ok(Stats {
            population: self.len(),
            top_score: self.iter().next().map(Entry::score),
            bottom_score: self.iter().last().map(Entry::score),
            distinct_ranks,
            generation: self.generation,
        })
    }

    /// Verify that the key map, arena and ordering agree and that the
    /// ordering is sorted with competition ranks.
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| -> Result<()> { Err(Error::InvariantViolation(msg)) };

        if self.index.len() != self.entries.len() || self.order.len() != self.entries.len() {
            return violation(format!(
                "size mismatch: {} keys, {} entries, {} ordered",
                self.index.len(),
                self.entries.len(),
                self.order.len()
            ));
        }

        for (key, id) in &self.index {
            match self.entries.get(id.index()) {
                Some(entry) if entry.key() == key => {}
                Some(entry) => {
                    return violation(format!("key {} maps to {} holding {}", key, id, entry.key()))
                }
                None => return violation(format!("key {} maps to missing {}", key, id)),
            }
        }

        let mut seen = vec![false; self.entries.len()];
        for id in &self.order {
            match seen.get_mut(id.index()) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return violation(format!("{} appears twice in ordering", id)),
                None => return violation(format!("ordering holds missing {}", id)),
            }
        }

        let scores: Vec<i32> = self.iter().map(Entry::score).collect();
        if let Some(pos) = scores.windows(2).position(|w| w[0] < w[1]) {
            return violation(format!("ordering not descending at position {}", pos + 1));
        }

        let expected = competition_ranks(&scores);
        if let Some((pos, entry)) = self
            .iter()
            .enumerate()
            .find(|(pos, entry)| entry.rank() != expected[*pos])
        {
            return violation(format!(
                "{} at position {} has rank {}, expected {}",
                entry.key(),
                pos,
                entry.rank(),
                expected[pos]
            ));
        }

        Ok(())
    }

    fn ensure_seeded(&self) -> Result<()> {
        if self.seeded {
            Ok(())
        } else {
            Err(Error::EmptyRegistry)
        }
    }
}
