//! Cosine similarity and bounded top-k selection.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Cosine of the angle between two vectors; 0 when either has no magnitude.
#[must_use]
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

struct Scored<T> {
    score: f64,
    position: usize,
    item: T,
}

// Higher score wins; on equal scores the earlier position wins.
impl<T> Ord for Scored<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl<T> PartialOrd for Scored<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Scored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scored<T> {}

/// The `k` candidates most similar to `target`, best first, with their
/// scores. Ties go to the candidate that comes first.
///
/// Keeps at most `k` candidates in a heap while scanning, so the cost is
/// linear in the number of candidates.
pub fn top_k<T, V, I>(target: &[f64], candidates: I, k: usize) -> Vec<(T, f64)>
where
    I: IntoIterator<Item = (T, V)>,
    V: AsRef<[f64]>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<Scored<T>>> = BinaryHeap::with_capacity(k + 1);
    for (position, (item, vector)) in candidates.into_iter().enumerate() {
        heap.push(Reverse(Scored {
            score: cosine(target, vector.as_ref()),
            position,
            item,
        }));
        if heap.len() > k {
            heap.pop();
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(scored)| (scored.item, scored.score))
        .collect()
}
