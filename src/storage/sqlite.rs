//! SQLite item store
//!
//! One table per collection with identical columns. Attributes are stored as
//! a JSON array, timestamps as fixed-width RFC 3339 text so that text order
//! matches time order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::level::Level;
use crate::storage::{migrations, ItemStore, StorageError, StorageResult};
use crate::types::{Collection, ItemDraft, ItemId, ItemKind, LearningItem, DEFAULT_WEIGHT};
use crate::weight::sanitize_weight;

const COLUMNS: &str = "id, kind, primary_form, attributes, level, weight, last_updated_at";

fn table(collection: Collection) -> &'static str {
    match collection {
        Collection::Personal => "personal_item",
        Collection::Reference => "reference_item",
    }
}

// ============================================================
// SqliteStore
// ============================================================

/// Item store backed by a single SQLite connection.
///
/// Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let conn = Connection::open(&db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;

        Self::with_connection(conn, path_str)
    }

    /// In-memory database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, db_path: String) -> StorageResult<Self> {
        let version = migrations::run_migrations(&conn)?;
        tracing::debug!(path = %db_path, version, "item store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Insert or replace many items in one transaction
    pub fn save_batch(&self, collection: Collection, items: &[LearningItem]) -> StorageResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for item in items {
            save_internal(&tx, collection, item)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    fn query_items(
        &self,
        collection: Collection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<LearningItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(params, |row| item_from_row(row, collection))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

impl ItemStore for SqliteStore {
    fn all(&self, collection: Collection) -> StorageResult<Vec<LearningItem>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id ASC", COLUMNS, table(collection));
        self.query_items(collection, &sql, [])
    }

    fn by_level(&self, collection: Collection, level: Level) -> StorageResult<Vec<LearningItem>> {
        if level.is_wildcard() {
            return self.all(collection);
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE level = ?1 ORDER BY id ASC",
            COLUMNS,
            table(collection)
        );
        self.query_items(collection, &sql, params![level.as_str()])
    }

    fn by_id(&self, collection: Collection, id: ItemId) -> StorageResult<Option<LearningItem>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", COLUMNS, table(collection));
        let item = conn
            .query_row(&sql, params![id], |row| item_from_row(row, collection))
            .optional()?;
        Ok(item)
    }

    fn insert(&self, collection: Collection, draft: &ItemDraft) -> StorageResult<LearningItem> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        let attributes = serde_json::to_string(&draft.attributes)?;

        conn.execute(
            &format!(
                "INSERT INTO {} (kind, primary_form, attributes, level, weight, last_updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table(collection)
            ),
            params![
                draft.kind.as_str(),
                draft.primary_form,
                attributes,
                draft.level.as_str(),
                DEFAULT_WEIGHT,
                format_datetime(now),
            ],
        )?;

        Ok(LearningItem {
            id: conn.last_insert_rowid(),
            kind: draft.kind,
            primary_form: draft.primary_form.clone(),
            attributes: draft.attributes.clone(),
            level: draft.level,
            weight: DEFAULT_WEIGHT,
            last_updated_at: now,
            origin: collection,
        })
    }

    fn save(&self, collection: Collection, item: &LearningItem) -> StorageResult<()> {
        let conn = self.get_conn()?;
        save_internal(&conn, collection, item)
    }

    fn delete(&self, collection: Collection, id: ItemId) -> StorageResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", table(collection)),
            params![id],
        )?;
        Ok(affected > 0)
    }

    fn count(&self, collection: Collection) -> StorageResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table(collection)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }

    fn top_by_weight(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        let sql = format!(
            r#"
            SELECT {} FROM personal_item
            WHERE (?1 = 'ALL' OR level = ?1)
            ORDER BY weight DESC, last_updated_at ASC, id ASC
            LIMIT ?2
            "#,
            COLUMNS
        );
        self.query_items(Collection::Personal, &sql, params![level.as_str(), limit as i64])
    }

    fn sample_distractors(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        let sql = format!(
            r#"
            SELECT {} FROM personal_item
            WHERE (?1 = 'ALL' OR level = ?1)
            ORDER BY RANDOM()
            LIMIT ?2
            "#,
            COLUMNS
        );
        self.query_items(Collection::Personal, &sql, params![level.as_str(), limit as i64])
    }

    fn update_weight(&self, id: ItemId, weight: f64, at: DateTime<Utc>) -> StorageResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE personal_item SET weight = ?1, last_updated_at = ?2 WHERE id = ?3",
            params![sanitize_weight(weight), format_datetime(at), id],
        )?;
        Ok(affected > 0)
    }
}

// ============================================================
// Row mapping
// ============================================================

fn save_internal(conn: &Connection, collection: Collection, item: &LearningItem) -> StorageResult<()> {
    let attributes = serde_json::to_string(&item.attributes)?;
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            table(collection),
            COLUMNS
        ),
        params![
            item.id,
            item.kind.as_str(),
            item.primary_form,
            attributes,
            item.level.as_str(),
            sanitize_weight(item.weight),
            format_datetime(item.last_updated_at),
        ],
    )?;
    Ok(())
}

fn item_from_row(row: &Row, origin: Collection) -> rusqlite::Result<LearningItem> {
    let kind: String = row.get("kind")?;
    let attributes: String = row.get("attributes")?;
    let level: String = row.get("level")?;
    let last_updated_at: String = row.get("last_updated_at")?;

    Ok(LearningItem {
        id: row.get("id")?,
        kind: ItemKind::parse(&kind)
            .ok_or_else(|| conversion_error(1, format!("unknown item kind: {}", kind)))?,
        primary_form: row.get("primary_form")?,
        attributes: serde_json::from_str(&attributes).map_err(|e| conversion_error(3, e))?,
        level: level.parse::<Level>().map_err(|e| conversion_error(4, e))?,
        weight: sanitize_weight(row.get("weight")?),
        last_updated_at: parse_datetime(&last_updated_at).map_err(|e| conversion_error(6, e))?,
        origin,
    })
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
