use rusqlite::{params, Connection, OptionalExtension};

use crate::config::CatalogConfig;
use crate::error::Result;

const MIGRATION_SQL: &str = include_str!("../migrations/0000_catalog.sql");

const MIGRATIONS: &[(&str, &str)] = &[("0000_catalog", MIGRATION_SQL)];

pub fn open_db(config: &CatalogConfig) -> Result<Connection> {
    let db_path = config.db_path()?;
    let conn = Connection::open(db_path)?;
    bootstrap(conn)
}

/// Fresh, private database. Used by tests and short-lived tools.
pub fn open_in_memory() -> Result<Connection> {
    bootstrap(Connection::open_in_memory()?)
}

fn bootstrap(conn: Connection) -> Result<Connection> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            id TEXT PRIMARY KEY NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )?;

    for (id, sql) in MIGRATIONS {
        apply_migration(&conn, id, sql)?;
    }
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

fn apply_migration(conn: &Connection, id: &str, sql: &str) -> Result<bool> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM schema_migrations WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Ok(false);
    }
    conn.execute_batch(sql)?;
    conn.execute(
        "INSERT INTO schema_migrations (id, applied_at) VALUES (?1, ?2)",
        params![id, chrono::Utc::now().timestamp_millis()],
    )?;
    log::info!("applied migration {}", id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{apply_migration, open_db, open_in_memory, MIGRATION_SQL};
    use crate::config::CatalogConfig;

    #[test]
    fn migration_is_recorded_once() {
        let conn = open_in_memory().unwrap();
        let applied = apply_migration(&conn, "0000_catalog", MIGRATION_SQL).unwrap();
        assert!(!applied);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn reopening_file_database_keeps_schema() {
        let dir = std::env::temp_dir().join(format!("catalog-db-{}", uuid::Uuid::new_v4()));
        let config = CatalogConfig {
            data_dir: dir.clone(),
            database_file: "catalog.db".to_string(),
        };
        {
            let conn = open_db(&config).unwrap();
            conn.execute("INSERT INTO genres (name) VALUES ('Poetry')", [])
                .unwrap();
        }
        let conn = open_db(&config).unwrap();
        let name: String = conn
            .query_row("SELECT name FROM genres", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Poetry");

        drop(conn);
        std::fs::remove_dir_all(&dir).ok();
    }
}
