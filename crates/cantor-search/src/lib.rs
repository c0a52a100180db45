//! Keyword search and ranking for the cantor hymn catalog.
//!
//! A query is classified by [`keyword::Query`], run through the tier plan of
//! [`aggregate::Aggregator`] (exact name, fuzzy name, lyric or phonetic,
//! fallback pool) and either paginated or randomly sampled. TF-IDF vectors
//! over tokenized lyrics drive [`HymnService::similar`]. Tokens, IDF models,
//! vectors and merged rankings are memoized in one shared [`NlpCache`] whose
//! keys embed the catalog's [`CorpusSignature`]. With lindera dictionaries
//! configured, [`MorphAnalyzer`] supplies morphemes and kana readings.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod digest;
pub mod idf;
pub mod keyword;
pub mod morphology;
pub mod pagination;
pub mod phonetic;
pub mod sampler;
pub mod service;
pub mod signature;
pub mod similarity;
pub mod tokenize;
pub mod vector;

pub use cache::{CacheStats, NlpCache};
pub use config::{Config, SearchSettings};
pub use keyword::Query;
pub use morphology::{Analyzers, MorphAnalyzer};
pub use pagination::Pagination;
pub use sampler::RandomSampler;
pub use service::{Created, HymnService};
pub use signature::CorpusSignature;
pub use tokenize::{Language, Tokenizer};
