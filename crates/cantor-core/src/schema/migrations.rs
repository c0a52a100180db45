/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Hymns (catalog entries). Rows are never removed: visible = 0 marks a
-- soft delete. updated_at is fixed-width RFC 3339 UTC, so text ordering is
-- chronological ordering.
CREATE TABLE IF NOT EXISTS hymns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name_jp TEXT NOT NULL,
    name_kr TEXT NOT NULL DEFAULT '',
    lyric TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL DEFAULT '',
    phonetic TEXT NOT NULL DEFAULT '',
    classical INTEGER NOT NULL DEFAULT 0,
    visible INTEGER NOT NULL DEFAULT 1,
    updated_by INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hymns_visible ON hymns(visible);
CREATE INDEX IF NOT EXISTS idx_hymns_name_jp ON hymns(name_jp);
CREATE INDEX IF NOT EXISTS idx_hymns_name_kr ON hymns(name_kr);
CREATE INDEX IF NOT EXISTS idx_hymns_updated_at ON hymns(updated_at);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
