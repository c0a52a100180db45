//! Integration tests for the on-disk catalog schema.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use cantor_core::model::{ActorId, HymnDraft};
use cantor_core::schema::Database;
use cantor_core::{Catalog, HymnFilter};

/// Reopening a database keeps its rows and does not re-run migrations.
#[test]
fn test_reopen_keeps_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("cantor.db");

    let id = {
        let db = Database::open(&db_path).expect("Failed to open database");
        db.insert(
            &HymnDraft::new("Amazing Grace", ActorId::new(1)).with_name_kr("나 같은 죄인"),
            Utc::now(),
        )
        .unwrap()
    };

    let db = Database::open(&db_path).expect("Failed to reopen database");
    let migrations: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(migrations, 1);

    let hymn = db.find_visible(id).unwrap().expect("hymn should persist");
    assert_eq!(hymn.name_kr, "나 같은 죄인");
}

/// Soft-deleted rows stay out of every read but still move the newest
/// modification time.
#[test]
fn test_soft_delete_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("cantor.db")).unwrap();

    let t0 = Utc::now();
    let id = db
        .insert(&HymnDraft::new("Amazing", ActorId::new(1)), t0)
        .unwrap();
    let t1 = t0 + Duration::seconds(1);
    db.set_visibility(id, false, ActorId::new(2), t1).unwrap();

    assert_eq!(db.count_visible().unwrap(), 0);
    assert!(db.list_visible(None).unwrap().is_empty());
    assert!(db
        .fetch_matching(&HymnFilter::ExactName("Amazing".to_string()))
        .unwrap()
        .is_empty());
    assert!(db.latest_modification().unwrap().unwrap() > t0);
}
