//! TF-IDF vectors, memoized per item and corpus signature.

use std::sync::Arc;

use cantor_core::model::HymnId;

use crate::cache::VectorKey;
use crate::digest::text_digest;
use crate::idf::IdfModel;
use crate::signature::CorpusSignature;
use crate::tokenize::{Language, Tokenizer};

/// Weight vector of `terms` in the coordinate order of `idf`.
///
/// Each coordinate is the term's count multiplied by its IDF weight; terms
/// unknown to the model are ignored.
#[must_use]
pub fn term_weights(terms: &[String], idf: &IdfModel) -> Vec<f64> {
    let mut vector = vec![0.0; idf.len()];
    for term in terms {
        if let Some((index, weight)) = idf.lookup(term) {
            vector[index] += weight;
        }
    }
    vector
}

/// Vector of one catalog item, built on a cache miss.
///
/// `idf` must be the model of `signature`; vectors of different signatures
/// are never comparable.
pub fn build_or_get(
    tokenizer: &Tokenizer,
    language: Language,
    signature: &CorpusSignature,
    item: HymnId,
    text: &str,
    idf: &IdfModel,
) -> Arc<[f64]> {
    let cache = tokenizer.cache();
    let key = VectorKey {
        language,
        signature: signature.clone(),
        item,
        digest: text_digest(text),
    };
    if let Some(vector) = cache.vector(&key) {
        return vector;
    }
    let terms = tokenizer.tokenize(language, text);
    let vector: Arc<[f64]> = Arc::from(term_weights(&terms, idf));
    cache.put_vector(key, Arc::clone(&vector));
    vector
}
