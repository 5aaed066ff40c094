//! Schema migrations
//!
//! Applied versions are recorded in `schema_migrations`; each pending
//! migration runs in its own transaction.

use rusqlite::Connection;

use crate::storage::{StorageError, StorageResult};

pub const CURRENT_SCHEMA_VERSION: i32 = 2;

const INIT_SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// All migrations, ordered by version
pub fn get_migrations() -> Vec<Migration> {
    vec![
        // V1: item tables
        Migration::new(1, "item tables", INIT_SCHEMA),
        // V2: learning-mode query indexes
        Migration::new(
            2,
            "level and weight indexes",
            r#"
            CREATE INDEX IF NOT EXISTS idx_personal_level_weight
                ON personal_item(level, weight DESC, last_updated_at ASC);

            CREATE INDEX IF NOT EXISTS idx_personal_weight
                ON personal_item(weight DESC, last_updated_at ASC);

            CREATE INDEX IF NOT EXISTS idx_reference_level
                ON reference_item(level);
            "#,
        ),
    ]
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| StorageError::Migration(format!("failed to create migrations table: {}", e)))?;

    Ok(())
}

/// Highest applied version, 0 for a fresh database
pub fn get_current_version(conn: &Connection) -> i32 {
    if ensure_migrations_table(conn).is_err() {
        return 0;
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

fn get_applied_versions(conn: &Connection) -> StorageResult<Vec<i32>> {
    ensure_migrations_table(conn)?;

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;

    Ok(versions)
}

fn record_migration(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.name,
            chrono::Utc::now().timestamp()
        ],
    )?;

    Ok(())
}

/// Apply every pending migration and return the resulting version.
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;

    let applied_versions = get_applied_versions(conn)?;
    let mut final_version = get_current_version(conn);

    tracing::debug!(
        current = final_version,
        target = CURRENT_SCHEMA_VERSION,
        "checking schema migrations"
    );

    for migration in get_migrations() {
        if applied_versions.contains(&migration.version) {
            continue;
        }

        tracing::info!(version = migration.version, name = %migration.name, "applying migration");

        if let Err(e) = execute_migration_in_transaction(conn, &migration) {
            tracing::error!(version = migration.version, error = %e, "migration failed");
            return Err(e);
        }
        final_version = migration.version;
    }

    Ok(final_version)
}

fn execute_migration_in_transaction(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE")?;

    match conn.execute_batch(&migration.sql) {
        Ok(()) => {
            if let Err(e) = record_migration(conn, migration) {
                conn.execute_batch("ROLLBACK").ok();
                return Err(e);
            }
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK").ok();
            Err(StorageError::Migration(format!(
                "migration v{} failed: {}",
                migration.version, e
            )))
        }
    }
}
