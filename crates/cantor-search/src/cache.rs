//! Process-wide cache shared by tokenization, IDF models, vectors and query
//! results.
//!
//! One bounded moka cache holds all four kinds of entries. Keys are typed so
//! that each lookup can only ever return the value kind it was stored with.

use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cantor_core::model::{HymnId, RankedHymn};

use crate::config::SearchSettings;
use crate::idf::IdfModel;
use crate::signature::CorpusSignature;
use crate::tokenize::Language;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenizeKey {
    pub language: Language,
    pub tokenizer: String,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrequencyModelKey {
    pub signature: CorpusSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorKey {
    pub language: Language,
    pub signature: CorpusSignature,
    pub item: HymnId,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryResultKey {
    pub keyword: String,
    pub signature: CorpusSignature,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Tokens(TokenizeKey),
    FrequencyModel(FrequencyModelKey),
    Vector(VectorKey),
    QueryResult(QueryResultKey),
}

#[derive(Debug, Clone)]
enum CachedValue {
    Tokens(Arc<[String]>),
    FrequencyModel(Arc<IdfModel>),
    Vector(Arc<[f64]>),
    QueryResult(Arc<[RankedHymn]>),
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, TTL-limited cache shared by every search session.
#[derive(Debug)]
pub struct NlpCache {
    inner: Cache<CacheKey, CachedValue>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl NlpCache {
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::new(settings.cache_capacity, settings.cache_ttl())
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let found = self.inner.get(key);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn tokens(&self, key: &TokenizeKey) -> Option<Arc<[String]>> {
        match self.lookup(&CacheKey::Tokens(key.clone()))? {
            CachedValue::Tokens(tokens) => Some(tokens),
            _ => None,
        }
    }

    pub fn put_tokens(&self, key: TokenizeKey, tokens: Arc<[String]>) {
        self.inner
            .insert(CacheKey::Tokens(key), CachedValue::Tokens(tokens));
    }

    pub fn frequency_model(&self, key: &FrequencyModelKey) -> Option<Arc<IdfModel>> {
        match self.lookup(&CacheKey::FrequencyModel(key.clone()))? {
            CachedValue::FrequencyModel(model) => Some(model),
            _ => None,
        }
    }

    pub fn put_frequency_model(&self, key: FrequencyModelKey, model: Arc<IdfModel>) {
        self.inner.insert(
            CacheKey::FrequencyModel(key),
            CachedValue::FrequencyModel(model),
        );
    }

    pub fn vector(&self, key: &VectorKey) -> Option<Arc<[f64]>> {
        match self.lookup(&CacheKey::Vector(key.clone()))? {
            CachedValue::Vector(vector) => Some(vector),
            _ => None,
        }
    }

    pub fn put_vector(&self, key: VectorKey, vector: Arc<[f64]>) {
        self.inner
            .insert(CacheKey::Vector(key), CachedValue::Vector(vector));
    }

    pub fn query_result(&self, key: &QueryResultKey) -> Option<Arc<[RankedHymn]>> {
        match self.lookup(&CacheKey::QueryResult(key.clone()))? {
            CachedValue::QueryResult(result) => Some(result),
            _ => None,
        }
    }

    pub fn put_query_result(&self, key: QueryResultKey, result: Arc<[RankedHymn]>) {
        self.inner
            .insert(CacheKey::QueryResult(key), CachedValue::QueryResult(result));
    }

    /// Drop every entry. Counters are kept.
    pub fn invalidate_all(&self) {
        let stats = self.stats();
        log::info!(
            "Invalidating search cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
            stats.entries,
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0
        );
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.inner.entry_count(),
        }
    }
}

impl Default for NlpCache {
    fn default() -> Self {
        Self::from_settings(&SearchSettings::default())
    }
}
