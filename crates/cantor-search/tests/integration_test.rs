//! Integration tests for search over an on-disk catalog.
//!
//! Each test opens a fresh SQLite file in a temporary directory and drives
//! it through `HymnService`, the way the CLI does.

use std::sync::Arc;
use std::thread;

use cantor_core::model::{ActorId, HymnDraft, HymnEdit, Tier};
use cantor_core::schema::Database;
use cantor_core::{Catalog, Error};
use cantor_search::{HymnService, NlpCache, RandomSampler, SearchSettings};
use tempfile::TempDir;

fn open(dir: &TempDir, cache: &Arc<NlpCache>) -> HymnService<Database> {
    let db = Database::open(dir.path().join("cantor.db")).expect("Failed to open database");
    HymnService::new(db, Arc::clone(cache), SearchSettings::default())
        .with_sampler(RandomSampler::seeded(3))
}

fn seed(service: &HymnService<Database>) {
    let drafts = [
        HymnDraft::new("Holy Holy Holy", ActorId::new(1)).with_lyric("거룩 거룩 거룩"),
        HymnDraft::new("Amazing Grace", ActorId::new(1)).with_lyric("나 같은 죄인 살리신"),
        HymnDraft::new("Be Thou My Vision", ActorId::new(1)).with_lyric("Amazing love"),
        HymnDraft::new("Amazing", ActorId::new(1)).with_classical(true),
    ];
    for draft in drafts {
        service.create(draft).expect("Failed to create hymn");
    }
}

#[test]
fn test_catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(NlpCache::default());
    seed(&open(&dir, &cache));

    let reopened = open(&dir, &cache);
    assert_eq!(reopened.total_count().unwrap(), 4);

    let page = reopened.search("Amazing", 1, 5).unwrap();
    let names: Vec<&str> = page.records.iter().map(|h| h.display_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["★Amazing", "Amazing Grace", "Be Thou My Vision", "Holy Holy Holy"]
    );
    let tiers: Vec<Tier> = page.records.iter().map(|h| h.tier).collect();
    assert_eq!(
        tiers,
        vec![
            Tier::ExactName,
            Tier::FuzzyNameOrSimilarity,
            Tier::LyricOrPhoneticMatch,
            Tier::FallbackPool,
        ]
    );
}

#[test]
fn test_workers_share_cache() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(NlpCache::default());
    seed(&open(&dir, &cache));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dir_path = dir.path().to_path_buf();
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let db = Database::open(dir_path.join("cantor.db")).unwrap();
                let service = HymnService::new(db, cache, SearchSettings::default());
                service.search("Amazing", 1, 5).unwrap().total_records
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 4);
    }
    assert!(cache.stats().hits + cache.stats().misses >= 4);
}

#[test]
fn test_stale_edit_across_connections() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(NlpCache::default());
    let alice = open(&dir, &cache);
    let bob = open(&dir, &cache);
    seed(&alice);

    let id = alice.search("Amazing", 1, 1).unwrap().records[0].id;
    let seen_by_alice = alice.catalog().find_visible(id).unwrap().unwrap();
    let seen_by_bob = bob.catalog().find_visible(id).unwrap().unwrap();

    let mut edit = HymnEdit::of(&seen_by_bob, ActorId::new(2));
    edit.link = "https://example.org/bob".to_string();
    bob.update(&edit).unwrap();

    let mut late = HymnEdit::of(&seen_by_alice, ActorId::new(1));
    late.link = "https://example.org/alice".to_string();
    let result = alice.update(&late);
    assert!(matches!(result, Err(Error::StaleWrite { .. })));
}

#[test]
fn test_similar_and_random_on_disk() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(NlpCache::default());
    let mut service = open(&dir, &cache);
    seed(&service);

    let first = service.search("", 1, 5).unwrap().records[0].id;
    let similar = service.similar(first).unwrap();
    assert_eq!(similar.len(), 4);
    assert_eq!(similar[0].id, first);

    let sample = service.random_sample("Amazing", 5).unwrap();
    assert_eq!(sample.len(), 4);
    assert!(sample.windows(2).all(|w| w[0].tier <= w[1].tier));
}
