//! Trigram similarity with the semantics of PostgreSQL's `pg_trgm`.
//!
//! Text is lowercased and split into words on non-alphanumeric characters.
//! Each word is padded with two leading blanks and one trailing blank, and
//! every three-character window of the padded word is a trigram. The
//! similarity of two strings is the size of the intersection of their
//! trigram sets divided by the size of the union.

use std::collections::HashSet;

type Trigram = [char; 3];

fn trigrams(text: &str) -> HashSet<Trigram> {
    let lowered = text.to_lowercase();
    let mut set = HashSet::new();
    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = [' ', ' ']
            .into_iter()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Similarity in `[0, 1]`; `0` when either side has no trigrams.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}
