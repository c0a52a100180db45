//! Inverse document frequency over a snapshot of tokenized documents.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::cache::{FrequencyModelKey, NlpCache};
use crate::signature::CorpusSignature;

/// Term weights of one corpus snapshot.
///
/// Terms are kept in sorted order; a term's position in that order is its
/// coordinate in every vector built against this model.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfModel {
    weights: BTreeMap<String, f64>,
    index: HashMap<String, usize>,
    documents: usize,
}

impl IdfModel {
    /// Count each distinct term once per document and weight it with
    /// `ln((N + 1) / (df + 1)) + 1`.
    pub fn fit<I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[String]>,
    {
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
        let mut total = 0usize;
        for document in documents {
            total += 1;
            let distinct: HashSet<&String> = document.as_ref().iter().collect();
            for term in distinct {
                *frequencies.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let n = total as f64;
        let weights: BTreeMap<String, f64> = frequencies
            .into_iter()
            .map(|(term, df)| {
                let weight = ((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0;
                (term, weight)
            })
            .collect();
        let index = weights
            .keys()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        Self {
            weights,
            index,
            documents: total,
        }
    }

    /// Number of terms, which is also the length of every vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[must_use]
    pub const fn document_count(&self) -> usize {
        self.documents
    }

    #[must_use]
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    /// Coordinate and weight of a term.
    #[must_use]
    pub fn lookup(&self, term: &str) -> Option<(usize, f64)> {
        let index = *self.index.get(term)?;
        Some((index, self.weight(term)?))
    }

    /// Terms in coordinate order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }
}

/// Return the model cached for `signature`, fitting it from `documents` on a
/// miss. On a hit `documents` is never iterated.
pub fn build_or_get<I, D>(
    cache: &NlpCache,
    signature: &CorpusSignature,
    documents: I,
) -> Arc<IdfModel>
where
    I: IntoIterator<Item = D>,
    D: AsRef<[String]>,
{
    let key = FrequencyModelKey {
        signature: signature.clone(),
    };
    if let Some(model) = cache.frequency_model(&key) {
        return model;
    }
    let model = Arc::new(IdfModel::fit(documents));
    log::debug!(
        "Built IDF model over {} documents ({} terms) for {}",
        model.document_count(),
        model.len(),
        signature
    );
    cache.put_frequency_model(key, Arc::clone(&model));
    model
}
