use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::filter::{HymnFilter, LyricTerm, NameField};
use crate::model::{ActorId, Hymn, HymnDraft, HymnId};
use crate::{text, trigram};

use super::migrations::MIGRATIONS;

const HYMN_COLUMNS: &str = "id, name_jp, name_kr, lyric, link, phonetic, classical, visible, \
                            updated_by, updated_at";

/// Render a timestamp in the fixed-width form stored in `updated_at`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A database connection implementing [`Catalog`] over the `hymns` table.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn init(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.register_functions()?;
        db.apply_migrations()?;
        Ok(db)
    }

    /// Install the SQL functions used by [`HymnFilter`] clauses.
    fn register_functions(&self) -> Result<()> {
        let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
        self.conn
            .create_scalar_function("similarity", 2, flags, |ctx| {
                let left: Option<String> = ctx.get(0)?;
                let right: Option<String> = ctx.get(1)?;
                Ok(match (left, right) {
                    (Some(left), Some(right)) => trigram::similarity(&left, &right),
                    _ => 0.0,
                })
            })?;
        self.conn.create_scalar_function("squash", 1, flags, |ctx| {
            let raw: Option<String> = ctx.get(0)?;
            Ok(raw.map(|raw| text::squash(&raw)))
        })?;
        Ok(())
    }

    fn apply_migrations(&self) -> Result<()> {
        // Create migrations table if it doesn't exist
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    fn row_to_hymn(row: &rusqlite::Row) -> rusqlite::Result<Hymn> {
        let updated_at: String = row.get(9)?;
        Ok(Hymn {
            id: HymnId::new(row.get(0)?),
            name_jp: row.get(1)?,
            name_kr: row.get(2)?,
            lyric: row.get(3)?,
            link: row.get(4)?,
            phonetic: row.get(5)?,
            classical: row.get(6)?,
            visible: row.get(7)?,
            updated_by: ActorId::new(row.get(8)?),
            updated_at: parse_timestamp(9, &updated_at)?,
        })
    }

    fn query_hymns(&self, sql: &str, values: &[Value]) -> Result<Vec<Hymn>> {
        let mut stmt = self.conn.prepare(sql)?;
        let hymns = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_hymn)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hymns)
    }
}

/// Collects positional parameters while a WHERE clause is being built.
#[derive(Debug, Default)]
struct Binder {
    values: Vec<Value>,
}

impl Binder {
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("?{}", self.values.len())
    }

    fn clause(&mut self, filter: &HymnFilter) -> String {
        match filter {
            HymnFilter::ExactName(keyword) => {
                let k = self.bind(keyword.clone());
                format!("(name_jp = {k} OR name_kr = {k})")
            }
            HymnFilter::FuzzyName { parts, threshold } => {
                let t = self.bind(*threshold);
                let clauses: Vec<String> = parts
                    .iter()
                    .map(|part| {
                        let p = self.bind(part.clone());
                        format!(
                            "(instr(name_jp, {p}) > 0 OR instr(name_kr, {p}) > 0 \
                             OR similarity(name_jp, {p}) > {t} OR similarity(name_kr, {p}) > {t})"
                        )
                    })
                    .collect();
                join_all(&clauses)
            }
            HymnFilter::LyricOrPhonetic { parts } => {
                let clauses: Vec<String> = parts.iter().map(|term| self.lyric_clause(term)).collect();
                join_all(&clauses)
            }
        }
    }

    fn lyric_clause(&mut self, term: &LyricTerm) -> String {
        let mut alternatives = Vec::with_capacity(2);
        if !term.lyric.is_empty() {
            let l = self.bind(term.lyric.clone());
            alternatives.push(format!("instr(squash(lyric), {l}) > 0"));
        }
        if let Some(reading) = term.phonetic.as_ref().filter(|r| !r.is_empty()) {
            let r = self.bind(reading.clone());
            alternatives.push(format!("instr(phonetic, {r}) > 0"));
        }
        if alternatives.is_empty() {
            return "0".to_string();
        }
        format!("({})", alternatives.join(" OR "))
    }
}

fn join_all(clauses: &[String]) -> String {
    if clauses.is_empty() {
        "0".to_string()
    } else {
        clauses.join(" AND ")
    }
}

impl Catalog for Database {
    fn list_visible(&self, exclude: Option<HymnId>) -> Result<Vec<Hymn>> {
        let sql = format!(
            "SELECT {HYMN_COLUMNS} FROM hymns
             WHERE visible = 1 AND (?1 IS NULL OR id <> ?1)
             ORDER BY id"
        );
        self.query_hymns(&sql, &[exclude.map_or(Value::Null, |id| Value::Integer(id.get()))])
    }

    fn find_visible(&self, id: HymnId) -> Result<Option<Hymn>> {
        let sql = format!("SELECT {HYMN_COLUMNS} FROM hymns WHERE visible = 1 AND id = ?1");
        let hymn = self
            .conn
            .query_row(&sql, [id.get()], Self::row_to_hymn)
            .optional()?;
        Ok(hymn)
    }

    fn fetch_matching(&self, filter: &HymnFilter) -> Result<Vec<Hymn>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let mut binder = Binder::default();
        let clause = binder.clause(filter);
        let sql = format!(
            "SELECT {HYMN_COLUMNS} FROM hymns WHERE visible = 1 AND ({clause}) ORDER BY id"
        );
        self.query_hymns(&sql, &binder.values)
    }

    fn count_visible(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM hymns WHERE visible = 1", [], |row| {
                    row.get(0)
                })?;
        Ok(count.unsigned_abs())
    }

    fn count_named(&self, field: NameField, name: &str, exclude: Option<HymnId>) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM hymns
             WHERE visible = 1 AND {} = ?1 AND (?2 IS NULL OR id <> ?2)",
            field.column()
        );
        let count: i64 = self.conn.query_row(
            &sql,
            rusqlite::params![name, exclude.map(HymnId::get)],
            |row| row.get(0),
        )?;
        Ok(count.unsigned_abs())
    }

    fn latest_modification(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> =
            self.conn
                .query_row("SELECT MAX(updated_at) FROM hymns", [], |row| row.get(0))?;
        raw.map(|raw| parse_timestamp(0, &raw))
            .transpose()
            .map_err(Error::from)
    }

    fn insert(&self, draft: &HymnDraft, at: DateTime<Utc>) -> Result<HymnId> {
        self.conn.execute(
            "INSERT INTO hymns (
                name_jp, name_kr, lyric, link, phonetic, classical, visible,
                updated_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
            rusqlite::params![
                draft.name_jp,
                draft.name_kr,
                draft.lyric,
                draft.link,
                draft.phonetic,
                draft.classical,
                draft.updated_by.get(),
                format_timestamp(at),
            ],
        )?;
        Ok(HymnId::new(self.conn.last_insert_rowid()))
    }

    fn update(&self, hymn: &Hymn, observed_at: DateTime<Utc>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE hymns SET
                name_jp = ?2, name_kr = ?3, lyric = ?4, link = ?5, phonetic = ?6,
                classical = ?7, updated_by = ?8, updated_at = ?9
             WHERE id = ?1 AND visible = 1 AND updated_at <= ?10",
            rusqlite::params![
                hymn.id.get(),
                hymn.name_jp,
                hymn.name_kr,
                hymn.lyric,
                hymn.link,
                hymn.phonetic,
                hymn.classical,
                hymn.updated_by.get(),
                format_timestamp(hymn.updated_at),
                format_timestamp(observed_at),
            ],
        )?;
        if changed > 0 {
            return Ok(());
        }
        if self.find_visible(hymn.id)?.is_some() {
            Err(Error::StaleWrite {
                entity: "hymn",
                id: hymn.id.to_string(),
            })
        } else {
            Err(Error::NotFound {
                entity: "hymn",
                id: hymn.id.to_string(),
            })
        }
    }

    fn set_visibility(
        &self,
        id: HymnId,
        visible: bool,
        by: ActorId,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE hymns SET visible = ?2, updated_by = ?3, updated_at = ?4
             WHERE id = ?1 AND visible = ?5",
            rusqlite::params![id.get(), visible, by.get(), format_timestamp(at), !visible],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "hymn",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
