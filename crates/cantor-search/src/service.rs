//! The hymn service: search, sampling, similarity and write-through
//! operations over a [`Catalog`].
//!
//! A service is cheap to build and meant to live on one worker; the
//! [`NlpCache`] behind it is shared by all workers through an `Arc`. Writes
//! never touch the cache: they move the catalog's newest timestamp, which
//! changes the [`CorpusSignature`] embedded in every derived cache key.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use std::iter;
use std::sync::Arc;

use cantor_core::model::{ActorId, Hymn, HymnDraft, HymnEdit, HymnId, RankedHymn, Tier};
use cantor_core::{text, Catalog, Error, NameField, Result};

use crate::aggregate::Aggregator;
use crate::cache::{CacheStats, NlpCache, QueryResultKey};
use crate::config::SearchSettings;
use crate::idf;
use crate::keyword::Query;
use crate::morphology::Analyzers;
use crate::pagination::Pagination;
use crate::phonetic::{self, KanaTransliterator, Transliterator};
use crate::sampler::RandomSampler;
use crate::signature::CorpusSignature;
use crate::similarity::top_k;
use crate::tokenize::{Language, Segmenter, Tokenizer};
use crate::vector;

/// Outcome of a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: HymnId,

    /// Page on which the new hymn shows up in an empty-keyword listing.
    pub last_page: usize,
}

#[derive(Debug)]
pub struct HymnService<C> {
    catalog: C,
    tokenizer: Tokenizer,
    transliterator: Arc<dyn Transliterator>,
    sampler: RandomSampler,
    settings: SearchSettings,
}

impl<C: Catalog> HymnService<C> {
    #[must_use]
    pub fn new(catalog: C, cache: Arc<NlpCache>, settings: SearchSettings) -> Self {
        Self {
            catalog,
            tokenizer: Tokenizer::new(cache),
            transliterator: Arc::new(KanaTransliterator),
            sampler: RandomSampler::from_os_rng(),
            settings,
        }
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: RandomSampler) -> Self {
        self.sampler = sampler;
        self
    }

    #[must_use]
    pub fn with_transliterator(mut self, transliterator: Arc<dyn Transliterator>) -> Self {
        self.transliterator = transliterator;
        self
    }

    /// Segment and read through the loaded dictionaries; a language without
    /// one keeps its built-in segmenter.
    #[must_use]
    pub fn with_analyzers(mut self, analyzers: &Analyzers) -> Self {
        if let Some(japanese) = &analyzers.japanese {
            self.tokenizer = self
                .tokenizer
                .with_segmenter(Language::Japanese, Arc::clone(japanese) as Arc<dyn Segmenter>);
            self.transliterator = Arc::clone(japanese) as Arc<dyn Transliterator>;
        }
        if let Some(korean) = &analyzers.korean {
            self.tokenizer = self
                .tokenizer
                .with_segmenter(Language::Korean, Arc::clone(korean) as Arc<dyn Segmenter>);
        }
        self
    }

    #[must_use]
    pub fn with_segmenter(mut self, language: Language, segmenter: Arc<dyn Segmenter>) -> Self {
        self.tokenizer = self.tokenizer.with_segmenter(language, segmenter);
        self
    }

    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.tokenizer.cache().stats()
    }

    fn aggregator(&self) -> Aggregator<'_, C> {
        aggregator(
            &self.catalog,
            &self.tokenizer,
            &self.transliterator,
            &self.settings,
        )
    }

    fn query_key(&self, query: &Query) -> Result<QueryResultKey> {
        Ok(QueryResultKey {
            keyword: query.cache_text(),
            signature: CorpusSignature::of(&self.catalog)?,
            total: self.catalog.count_visible()?,
        })
    }

    /// Full tier-ordered ranking of a query, from the cache when possible.
    fn ranked(&self, query: &Query) -> Result<Arc<[RankedHymn]>> {
        let key = self.query_key(query)?;
        let cache = self.tokenizer.cache();
        if let Some(ranked) = cache.query_result(&key) {
            log::debug!("Query cache hit for {:?}", key.keyword);
            return Ok(ranked);
        }
        let ranked: Arc<[RankedHymn]> = Arc::from(self.aggregator().ranked(query)?);
        cache.put_query_result(key, Arc::clone(&ranked));
        Ok(ranked)
    }

    /// One page of the ranking of `keyword`.
    ///
    /// Page numbers start at 1; anything lower is read as 1, and a page past
    /// the end comes back empty as page 1 of 1.
    pub fn search(
        &self,
        keyword: &str,
        page_num: usize,
        page_size: usize,
    ) -> Result<Pagination<RankedHymn>> {
        let query = Query::parse(keyword);
        let ranked = self.ranked(&query)?;

        let page_num = page_num.max(1);
        let page_size = page_size.max(1);
        let start = (page_num - 1).saturating_mul(page_size).min(ranked.len());
        let end = start.saturating_add(page_size).min(ranked.len());

        Ok(Pagination::with_navigation(
            ranked[start..end].to_vec(),
            ranked.len(),
            page_num,
            page_size,
            self.settings.navigation_pages,
        ))
    }

    /// Up to `page_size` distinct random results for `keyword`, tier-sorted.
    pub fn random_sample(&mut self, keyword: &str, page_size: usize) -> Result<Vec<RankedHymn>> {
        let query = Query::parse(keyword);
        let key = self.query_key(&query)?;
        let cached = self.tokenizer.cache().query_result(&key);

        let Self {
            catalog,
            tokenizer,
            transliterator,
            sampler,
            settings,
        } = self;
        aggregator(catalog, tokenizer, transliterator, settings).random(
            &query,
            page_size,
            sampler,
            cached.as_deref(),
        )
    }

    /// Clear every cached entry.
    pub fn invalidate_all(&self) {
        self.tokenizer.cache().invalidate_all();
    }

    pub fn item_by_id(&self, id: HymnId) -> Result<RankedHymn> {
        let hymn = self.find(id)?;
        Ok(RankedHymn::new(&hymn, Tier::ExactName))
    }

    fn find(&self, id: HymnId) -> Result<Hymn> {
        self.catalog.find_visible(id)?.ok_or_else(|| Error::NotFound {
            entity: "hymn",
            id: id.to_string(),
        })
    }

    /// The hymn followed by its closest neighbours by TF-IDF cosine
    /// similarity of their Korean lyrics.
    pub fn similar(&self, id: HymnId) -> Result<Vec<RankedHymn>> {
        let target = self.find(id)?;
        let others = self.catalog.list_visible(Some(id))?;
        let signature = CorpusSignature::of(&self.catalog)?;

        let documents = iter::once(&target)
            .chain(&others)
            .map(|hymn| self.tokenizer.tokenize(Language::Korean, &hymn.lyric));
        let idf = idf::build_or_get(self.tokenizer.cache(), &signature, documents);

        let vector_of = |hymn: &Hymn| {
            vector::build_or_get(
                &self.tokenizer,
                Language::Korean,
                &signature,
                hymn.id,
                &hymn.lyric,
                &idf,
            )
        };
        let target_vector = vector_of(&target);
        let neighbours = top_k(
            &target_vector,
            others.iter().map(|hymn| (hymn, vector_of(hymn))),
            self.settings.similar_count,
        );

        let mut result = Vec::with_capacity(neighbours.len() + 1);
        result.push(RankedHymn::new(&target, Tier::ExactName));
        result.extend(
            neighbours
                .into_iter()
                .map(|(hymn, _)| RankedHymn::new(hymn, Tier::FuzzyNameOrSimilarity)),
        );
        Ok(result)
    }

    pub fn total_count(&self) -> Result<u64> {
        self.catalog.count_visible()
    }

    /// Whether a visible hymn other than `exclude` already uses `name`.
    pub fn check_duplicate(
        &self,
        field: NameField,
        name: &str,
        exclude: Option<HymnId>,
    ) -> Result<bool> {
        Ok(self.catalog.count_named(field, name, exclude)? > 0)
    }

    fn ensure_unique(&self, name_jp: &str, name_kr: &str, exclude: Option<HymnId>) -> Result<()> {
        if self.check_duplicate(NameField::Primary, name_jp, exclude)? {
            return Err(Error::Duplicate {
                field: NameField::Primary.column(),
                value: name_jp.to_string(),
            });
        }
        if !name_kr.is_empty() && self.check_duplicate(NameField::Secondary, name_kr, exclude)? {
            return Err(Error::Duplicate {
                field: NameField::Secondary.column(),
                value: name_kr.to_string(),
            });
        }
        Ok(())
    }

    fn phonetic_of(&self, lyric: &str) -> String {
        phonetic::transliterate(&self.tokenizer, self.transliterator.as_ref(), lyric)
    }

    /// Timestamp for the next write: now, truncated to what the store keeps,
    /// and strictly after every stored timestamp.
    fn next_timestamp(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now().trunc_subsecs(6);
        Ok(match self.catalog.latest_modification()? {
            Some(latest) if latest >= now => latest + Duration::microseconds(1),
            _ => now,
        })
    }

    /// Store a new hymn.
    pub fn create(&self, draft: HymnDraft) -> Result<Created> {
        self.ensure_unique(&draft.name_jp, &draft.name_kr, None)?;

        let mut draft = draft;
        draft.lyric = text::trim_lyric(&draft.lyric);
        draft.phonetic = self.phonetic_of(&draft.lyric);

        let at = self.next_timestamp()?;
        let id = self.catalog.insert(&draft, at)?;
        let total = usize::try_from(self.catalog.count_visible()?).unwrap_or(usize::MAX);
        let last_page = total.div_ceil(self.settings.page_size.max(1)).max(1);
        log::info!("Created hymn {} ({:?})", id, draft.name_jp);

        Ok(Created { id, last_page })
    }

    /// Apply an edit, provided nobody changed the hymn since `observed_at`
    /// and the edit actually changes something.
    pub fn update(&self, edit: &HymnEdit) -> Result<Hymn> {
        let current = self.find(edit.id)?;
        if current.updated_at > edit.observed_at {
            return Err(Error::StaleWrite {
                entity: "hymn",
                id: edit.id.to_string(),
            });
        }
        if edit.is_noop_for(&current) {
            return Err(Error::NoChange {
                entity: "hymn",
                id: edit.id.to_string(),
            });
        }
        self.ensure_unique(&edit.name_jp, &edit.name_kr, Some(edit.id))?;

        let phonetic = self.phonetic_of(&text::trim_lyric(&edit.lyric));
        let updated = edit.apply_to(&current, phonetic, self.next_timestamp()?);
        self.catalog.update(&updated, edit.observed_at)?;
        log::info!("Updated hymn {}", updated.id);
        Ok(updated)
    }

    /// Soft-delete a hymn.
    pub fn delete(&self, id: HymnId, by: ActorId) -> Result<()> {
        self.catalog
            .set_visibility(id, false, by, self.next_timestamp()?)?;
        log::info!("Deleted hymn {id}");
        Ok(())
    }

    /// Bring a soft-deleted hymn back.
    pub fn restore(&self, id: HymnId, by: ActorId) -> Result<()> {
        self.catalog
            .set_visibility(id, true, by, self.next_timestamp()?)?;
        log::info!("Restored hymn {id}");
        Ok(())
    }
}

fn aggregator<'a, C: Catalog>(
    catalog: &'a C,
    tokenizer: &'a Tokenizer,
    transliterator: &'a Arc<dyn Transliterator>,
    settings: &SearchSettings,
) -> Aggregator<'a, C> {
    Aggregator::new(
        catalog,
        tokenizer,
        transliterator.as_ref(),
        settings.similarity_threshold,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantor_core::schema::Database;

    fn service() -> HymnService<Database> {
        HymnService::new(
            Database::open_in_memory().unwrap(),
            Arc::new(NlpCache::default()),
            SearchSettings::default(),
        )
        .with_sampler(RandomSampler::seeded(17))
    }

    fn draft(name: &str) -> HymnDraft {
        HymnDraft::new(name, ActorId::new(1))
    }

    fn add(service: &HymnService<Database>, draft: HymnDraft) -> HymnId {
        service.create(draft).unwrap().id
    }

    #[test]
    fn test_search_orders_by_tier() {
        let service = service();
        let c = add(&service, draft("Be Thou My Vision").with_lyric("Amazing love"));
        let b = add(&service, draft("Amazing Grace"));
        let a = add(&service, draft("Amazing"));

        let page = service.search("Amazing", 1, 5).unwrap();
        let ids: Vec<HymnId> = page.records.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(page.records[0].tier, Tier::ExactName);
        assert_eq!(page.records[1].tier, Tier::FuzzyNameOrSimilarity);
        assert_eq!(page.records[2].tier, Tier::LyricOrPhoneticMatch);
    }

    #[test]
    fn test_search_pages() {
        let service = service();
        for i in 0..23 {
            add(&service, draft(&format!("hymn {i:02}")));
        }
        let first = service.search("", 1, 5).unwrap();
        assert_eq!(first.total_pages, 5);
        assert_eq!(first.total_records, 23);
        assert!(!first.has_prev_page);

        let last = service.search("", 5, 5).unwrap();
        assert_eq!(last.records.len(), 3);
        assert!(!last.has_next_page);

        let zero = service.search("", 0, 5).unwrap();
        assert_eq!(zero.page_num, 1);

        let beyond = service.search("", 9, 5).unwrap();
        assert!(beyond.records.is_empty());
        assert_eq!(beyond.total_pages, 1);
        assert_eq!(beyond.page_size, 0);
    }

    #[test]
    fn test_search_result_cached_until_write() {
        let service = service();
        add(&service, draft("Amazing"));
        let before = service.search("Amazing", 1, 5).unwrap();
        let hits = service.cache_stats().hits;

        let again = service.search("Amazing", 1, 5).unwrap();
        assert_eq!(before, again);
        assert!(service.cache_stats().hits > hits);

        add(&service, draft("Amazing Grace"));
        let after = service.search("Amazing", 1, 5).unwrap();
        assert_eq!(after.total_records, 2);
    }

    #[test]
    fn test_delete_invalidates_through_signature() {
        let service = service();
        let a = add(&service, draft("Amazing"));
        add(&service, draft("Other"));
        assert_eq!(service.search("Amazing", 1, 5).unwrap().total_records, 2);

        service.delete(a, ActorId::new(2)).unwrap();
        let after = service.search("Amazing", 1, 5).unwrap();
        assert_eq!(after.total_records, 1);
        assert_eq!(after.records[0].tier, Tier::FallbackPool);

        service.restore(a, ActorId::new(2)).unwrap();
        assert_eq!(service.search("Amazing", 1, 5).unwrap().records[0].id, a);
    }

    #[test]
    fn test_random_sample_sizes() {
        let mut service = service();
        for i in 0..8 {
            add(&service, draft(&format!("Grace {i}")));
        }
        let page = service.random_sample("Grace", 5).unwrap();
        assert_eq!(page.len(), 5);
        let ids: std::collections::HashSet<_> = page.iter().map(|h| h.id).collect();
        assert_eq!(ids.len(), 5);

        let mut small = self::service();
        add(&small, draft("a"));
        add(&small, draft("b"));
        assert_eq!(small.random_sample("", 5).unwrap().len(), 2);
    }

    #[test]
    fn test_item_by_id() {
        let service = service();
        let id = add(&service, draft("聖なるかな").with_classical(true));
        let item = service.item_by_id(id).unwrap();
        assert_eq!(item.display_name, "★聖なるかな");

        let missing = service.item_by_id(HymnId::new(404));
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_similar_ranks_by_lyric() {
        let service = service();
        let target = add(&service, draft("t").with_lyric("주 은혜 놀라워 주 사랑"));
        let close = add(&service, draft("close").with_lyric("주 은혜 놀라워"));
        let mid = add(&service, draft("mid").with_lyric("주 사랑 평화"));
        add(&service, draft("far").with_lyric("바다 하늘"));
        add(&service, draft("far2").with_lyric("산 나무"));

        let result = service.similar(target).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0].id, target);
        assert_eq!(result[0].tier, Tier::ExactName);
        assert_eq!(result[1].id, close);
        assert_eq!(result[2].id, mid);
        assert!(result[1..].iter().all(|h| h.tier == Tier::FuzzyNameOrSimilarity));
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let service = service();
        add(&service, draft("Amazing").with_name_kr("놀라운"));

        let dup = service.create(draft("Amazing"));
        assert!(matches!(dup, Err(Error::Duplicate { field: "name_jp", .. })));

        let dup_kr = service.create(draft("Other").with_name_kr("놀라운"));
        assert!(matches!(dup_kr, Err(Error::Duplicate { field: "name_kr", .. })));

        assert!(service.check_duplicate(NameField::Primary, "Amazing", None).unwrap());
        assert_eq!(service.total_count().unwrap(), 1);
    }

    #[test]
    fn test_create_reports_last_page() {
        let service = service();
        for i in 0..5 {
            assert_eq!(service.create(draft(&format!("h{i}"))).unwrap().last_page, 1);
        }
        assert_eq!(service.create(draft("h5")).unwrap().last_page, 2);
    }

    #[test]
    fn test_create_normalizes_lyric_and_phonetic() {
        let service = service();
        let mut raw = draft("かみのこひつじ");
        raw.lyric = "\u{3000}かみの こひつじ ".to_string();
        let id = add(&service, raw);

        let stored = service.catalog().find_visible(id).unwrap().unwrap();
        assert_eq!(stored.lyric, "かみの こひつじ");
        assert_eq!(stored.phonetic, "カミノコヒツジ");
    }

    #[test]
    fn test_update_no_change() {
        let service = service();
        let id = add(&service, draft("Amazing"));
        let current = service.catalog().find_visible(id).unwrap().unwrap();

        let edit = HymnEdit::of(&current, ActorId::new(2));
        assert!(matches!(service.update(&edit), Err(Error::NoChange { .. })));
    }

    #[test]
    fn test_update_stale_write() {
        let service = service();
        let id = add(&service, draft("Amazing"));
        let t0 = service.catalog().find_visible(id).unwrap().unwrap();

        let mut first = HymnEdit::of(&t0, ActorId::new(2));
        first.name_jp = "Amazing Grace".to_string();
        let t1 = service.update(&first).unwrap();
        assert!(t1.updated_at > t0.updated_at);

        let mut late = HymnEdit::of(&t0, ActorId::new(3));
        late.link = "https://example.org/late".to_string();
        let result = service.update(&late);
        assert!(matches!(result, Err(Error::StaleWrite { .. })));
    }

    #[test]
    fn test_update_applies_edit() {
        let service = service();
        let id = add(&service, draft("Amazing"));
        let current = service.catalog().find_visible(id).unwrap().unwrap();

        let mut edit = HymnEdit::of(&current, ActorId::new(2));
        edit.lyric = "ハレルヤ".to_string();
        let updated = service.update(&edit).unwrap();

        let stored = service.catalog().find_visible(id).unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.phonetic, "ハレルヤ");
        assert_eq!(stored.updated_by, ActorId::new(2));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let service = service();
        let result = service.delete(HymnId::new(1), ActorId::new(1));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_invalidate_all_forces_recompute() {
        let service = service();
        add(&service, draft("Amazing"));
        service.search("Amazing", 1, 5).unwrap();
        service.invalidate_all();
        let misses = service.cache_stats().misses;
        service.search("Amazing", 1, 5).unwrap();
        assert!(service.cache_stats().misses > misses);
    }

    /// Reads a few kanji words the way a dictionary would, and kana as is.
    #[derive(Debug)]
    struct KanjiReadings;

    impl Transliterator for KanjiReadings {
        fn reading(&self, token: &str) -> String {
            match token {
                "神" => "カミ".to_string(),
                "子羊" => "コヒツジ".to_string(),
                other => KanaTransliterator.reading(other),
            }
        }
    }

    #[test]
    fn test_kanji_lyric_matches_kana_keyword() {
        let mut service = service().with_transliterator(Arc::new(KanjiReadings));
        let lamb = add(&service, draft("x").with_lyric("神の子羊"));
        add(&service, draft("y").with_lyric("主の祈り"));

        let stored = service.catalog().find_visible(lamb).unwrap().unwrap();
        assert_eq!(stored.phonetic, "カミノコヒツジ");

        for keyword in ["かみ", "こひつじ"] {
            let page = service.search(keyword, 1, 5).unwrap();
            assert_eq!(page.records[0].id, lamb);
            assert_eq!(page.records[0].tier, Tier::LyricOrPhoneticMatch);
            assert_eq!(page.records[1].tier, Tier::FallbackPool);
        }

        let sample = service.random_sample("こひつじ", 1).unwrap();
        assert_eq!(sample[0].id, lamb);
    }

    #[test]
    fn test_empty_analyzers_keep_built_in_readings() {
        let service = service().with_analyzers(&Analyzers::default());
        let id = add(&service, draft("x").with_lyric("かみの こひつじ"));
        let stored = service.catalog().find_visible(id).unwrap().unwrap();
        assert_eq!(stored.phonetic, "カミノコヒツジ");
    }

    #[test]
    fn test_dictionary_reads_kanji_lyrics() {
        let Ok(path) = std::env::var("CANTOR_TEST_IPADIC") else {
            return;
        };
        let analyzers = Analyzers {
            japanese: Some(Arc::new(crate::MorphAnalyzer::load(&path).unwrap())),
            korean: None,
        };
        let service = service().with_analyzers(&analyzers);
        let lamb = add(&service, draft("x").with_lyric("神の子羊"));

        let stored = service.catalog().find_visible(lamb).unwrap().unwrap();
        assert_eq!(stored.phonetic, "カミノコヒツジ");
        for keyword in ["かみ", "こひつじ"] {
            let page = service.search(keyword, 1, 5).unwrap();
            assert_eq!(page.records[0].tier, Tier::LyricOrPhoneticMatch);
        }
    }
}
