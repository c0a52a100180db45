//! Tiered matching: exact name, fuzzy name, lyric or phonetic, fallback.
//!
//! Each tier is fetched from the catalog in order and only contributes items
//! no earlier tier already produced, so every id appears once and the merged
//! list is ordered by tier, then by catalog order within a tier.

use std::collections::HashSet;

use cantor_core::model::{Hymn, HymnId, RankedHymn, Tier};
use cantor_core::{text, Catalog, HymnFilter, LyricTerm};

use crate::keyword::Query;
use crate::phonetic::{self, Transliterator};
use crate::sampler::RandomSampler;
use crate::tokenize::Tokenizer;

/// One step of the tier plan. `filter` is `None` for the fallback pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub tier: Tier,
    pub filter: Option<HymnFilter>,
}

/// Runs the tier plan of a query against a catalog.
#[derive(Debug)]
pub struct Aggregator<'a, C: ?Sized> {
    catalog: &'a C,
    tokenizer: &'a Tokenizer,
    transliterator: &'a dyn Transliterator,
    threshold: f64,
}

impl<'a, C: Catalog + ?Sized> Aggregator<'a, C> {
    pub fn new(
        catalog: &'a C,
        tokenizer: &'a Tokenizer,
        transliterator: &'a dyn Transliterator,
        threshold: f64,
    ) -> Self {
        Self {
            catalog,
            tokenizer,
            transliterator,
            threshold,
        }
    }

    /// Tiers a query goes through, in order.
    ///
    /// Compound queries have no exact-name tier; empty and unsafe queries go
    /// straight to the fallback pool.
    pub fn stages(&self, query: &Query) -> Vec<Stage> {
        let fallback = Stage {
            tier: Tier::FallbackPool,
            filter: None,
        };
        let parts = query.parts();
        if parts.is_empty() {
            return vec![fallback];
        }

        let mut stages = Vec::with_capacity(4);
        if let Query::Single(keyword) = query {
            stages.push(Stage {
                tier: Tier::ExactName,
                filter: Some(HymnFilter::ExactName(keyword.clone())),
            });
        }
        stages.push(Stage {
            tier: Tier::FuzzyNameOrSimilarity,
            filter: Some(HymnFilter::FuzzyName {
                parts: parts.iter().map(|p| (*p).to_string()).collect(),
                threshold: self.threshold,
            }),
        });
        stages.push(Stage {
            tier: Tier::LyricOrPhoneticMatch,
            filter: Some(HymnFilter::LyricOrPhonetic {
                parts: parts.iter().map(|p| self.lyric_term(p)).collect(),
            }),
        });
        stages.push(fallback);
        stages
    }

    fn lyric_term(&self, part: &str) -> LyricTerm {
        let reading = phonetic::transliterate(self.tokenizer, self.transliterator, part);
        LyricTerm {
            lyric: text::squash(part),
            phonetic: (!reading.is_empty()).then_some(reading),
        }
    }

    fn fetch(&self, stage: &Stage) -> cantor_core::Result<Vec<Hymn>> {
        match &stage.filter {
            Some(filter) => self.catalog.fetch_matching(filter),
            None => self.catalog.list_visible(None),
        }
    }

    /// Fetch one stage, dropping ids already in `seen` and recording the rest.
    fn fetch_new(
        &self,
        stage: &Stage,
        seen: &mut HashSet<HymnId>,
    ) -> cantor_core::Result<Vec<RankedHymn>> {
        Ok(self
            .fetch(stage)?
            .iter()
            .filter(|hymn| seen.insert(hymn.id))
            .map(|hymn| RankedHymn::new(hymn, stage.tier))
            .collect())
    }

    /// Full merged ranking of a query over every visible hymn.
    pub fn ranked(&self, query: &Query) -> cantor_core::Result<Vec<RankedHymn>> {
        if let Query::Unsafe(keyword) = query {
            log::warn!("Unsafe keyword {keyword:?} screened, listing the full catalog");
        }
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for stage in self.stages(query) {
            merged.extend(self.fetch_new(&stage, &mut seen)?);
        }
        merged.sort_by_key(|hymn| hymn.tier);
        Ok(merged)
    }

    /// A random page of at most `page_size` results.
    ///
    /// Tiers are consumed in order. As soon as the items collected so far
    /// plus the next tier can fill a page, the page is completed from that
    /// tier alone and later tiers are never fetched. When `cached` holds the
    /// merged ranking of this query it is used instead of the catalog.
    pub fn random(
        &self,
        query: &Query,
        page_size: usize,
        sampler: &mut RandomSampler,
        cached: Option<&[RankedHymn]>,
    ) -> cantor_core::Result<Vec<RankedHymn>> {
        if let Query::Unsafe(keyword) = query {
            log::warn!("Unsafe keyword {keyword:?} screened, returning the first page");
            let mut first = match cached {
                Some(merged) => merged.to_vec(),
                None => self.ranked(query)?,
            };
            first.truncate(page_size);
            return Ok(first);
        }

        let key = |hymn: &RankedHymn| hymn.id;
        let mut seen = HashSet::new();
        let mut selected: Vec<RankedHymn> = Vec::new();
        for stage in self.stages(query) {
            let tier_items = match cached {
                Some(merged) => merged
                    .iter()
                    .filter(|hymn| hymn.tier == stage.tier)
                    .cloned()
                    .collect(),
                None => self.fetch_new(&stage, &mut seen)?,
            };
            if stage.tier == Tier::FallbackPool || selected.len() + tier_items.len() >= page_size
            {
                let mut page = sampler.backfill(selected, &tier_items, page_size, key);
                page.sort_by_key(|hymn| hymn.tier);
                return Ok(page);
            }
            selected.extend(tier_items);
        }
        Ok(selected)
    }
}
