//! Distinct random sampling with backfill.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Random source for sampled search results.
///
/// Holds an injected generator so tests can run with a fixed seed.
pub struct RandomSampler {
    rng: Box<dyn RngCore + Send>,
}

impl fmt::Debug for RandomSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSampler").finish_non_exhaustive()
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl RandomSampler {
    /// Sampler seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic sampler.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Draw uniformly with replacement from `pool` until `page_size`
    /// distinct items are collected.
    ///
    /// A pool with fewer distinct items than that is handed to
    /// [`backfill`](Self::backfill) instead, which returns all of them.
    pub fn sample_distinct<T, K, F>(&mut self, pool: &[T], page_size: usize, key: F) -> Vec<T>
    where
        T: Clone,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let distinct = pool.iter().map(&key).collect::<HashSet<_>>().len();
        if distinct < page_size {
            return self.backfill(Vec::new(), pool, page_size, key);
        }

        let mut seen = HashSet::with_capacity(page_size);
        let mut picked = Vec::with_capacity(page_size);
        while picked.len() < page_size {
            let candidate = &pool[self.rng.random_range(0..pool.len())];
            if seen.insert(key(candidate)) {
                picked.push(candidate.clone());
            }
        }
        picked
    }

    /// Top `selected` up to `page_size` items with random picks from
    /// `superset` that are not selected yet.
    ///
    /// Returns fewer than `page_size` items when the superset runs out, and
    /// never more: an oversized selection is cut down to a random subset.
    pub fn backfill<T, K, F>(
        &mut self,
        selected: Vec<T>,
        superset: &[T],
        page_size: usize,
        key: F,
    ) -> Vec<T>
    where
        T: Clone,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut seen = HashSet::new();
        let mut result: Vec<T> = selected
            .into_iter()
            .filter(|item| seen.insert(key(item)))
            .collect();
        while result.len() > page_size {
            let index = self.rng.random_range(0..result.len());
            result.swap_remove(index);
        }

        let mut candidates: Vec<&T> = superset
            .iter()
            .filter(|item| seen.insert(key(*item)))
            .collect();
        while result.len() < page_size && !candidates.is_empty() {
            let index = self.rng.random_range(0..candidates.len());
            result.push(candidates.swap_remove(index).clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    fn distinct(items: &[u32]) -> usize {
        items.iter().collect::<HashSet<_>>().len()
    }

    #[test]
    fn test_sample_distinct_fills_page() {
        let mut sampler = RandomSampler::seeded(7);
        let picked = sampler.sample_distinct(&ids(20), 5, |id| *id);
        assert_eq!(picked.len(), 5);
        assert_eq!(distinct(&picked), 5);
    }

    #[test]
    fn test_sample_distinct_with_duplicate_pool() {
        let mut sampler = RandomSampler::seeded(7);
        let pool = vec![1, 1, 2, 2, 3];
        let picked = sampler.sample_distinct(&pool, 5, |id| *id);
        assert_eq!(picked.len(), 3);
        assert_eq!(distinct(&picked), 3);
    }

    #[test]
    fn test_backfill_keeps_selection() {
        let mut sampler = RandomSampler::seeded(1);
        let result = sampler.backfill(vec![3, 4], &ids(10), 5, |id| *id);
        assert_eq!(result.len(), 5);
        assert_eq!(&result[..2], &[3, 4]);
        assert_eq!(distinct(&result), 5);
    }

    #[test]
    fn test_backfill_exhausted_superset() {
        let mut sampler = RandomSampler::seeded(1);
        let result = sampler.backfill(vec![1], &[1, 2], 5, |id| *id);
        let mut sorted = result.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn test_backfill_cuts_oversized_selection() {
        let mut sampler = RandomSampler::seeded(3);
        let result = sampler.backfill(ids(8), &[], 5, |id| *id);
        assert_eq!(result.len(), 5);
        assert_eq!(distinct(&result), 5);
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let a = RandomSampler::seeded(42).sample_distinct(&ids(50), 5, |id| *id);
        let b = RandomSampler::seeded(42).sample_distinct(&ids(50), 5, |id| *id);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_sample_is_distinct_and_bounded(
            pool in prop::collection::vec(0u32..30, 0..40),
            page_size in 0usize..8,
            seed in any::<u64>(),
        ) {
            let mut sampler = RandomSampler::seeded(seed);
            let picked = sampler.sample_distinct(&pool, page_size, |id| *id);
            prop_assert_eq!(picked.len(), page_size.min(distinct(&pool)));
            prop_assert_eq!(distinct(&picked), picked.len());
            prop_assert!(picked.iter().all(|id| pool.contains(id)));
        }

        #[test]
        fn prop_backfill_is_distinct_and_bounded(
            selected in prop::collection::hash_set(0u32..30, 0..8),
            superset in prop::collection::vec(0u32..30, 0..40),
            page_size in 0usize..8,
            seed in any::<u64>(),
        ) {
            let selected: Vec<u32> = selected.into_iter().collect();
            let mut sampler = RandomSampler::seeded(seed);
            let result = sampler.backfill(selected.clone(), &superset, page_size, |id| *id);
            prop_assert!(result.len() <= page_size);
            prop_assert_eq!(distinct(&result), result.len());

            let available = selected.iter().chain(&superset).collect::<HashSet<_>>().len();
            prop_assert_eq!(result.len(), page_size.min(available));
        }
    }
}
