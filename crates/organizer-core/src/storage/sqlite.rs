use super::ledger::Ledger;
use crate::error::Error;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_VERSION: i64 = 1;

/// SQLite-backed ledger. One row per processed entry name.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        let ledger = SqliteLedger {
            conn: Mutex::new(conn),
        };
        ledger.configure_pragmas()?;
        ledger.migrate_schema()?;
        debug!("Ledger opened at {}", path.display());
        Ok(ledger)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        let ledger = SqliteLedger {
            conn: Mutex::new(conn),
        };
        ledger.migrate_schema()?;
        Ok(ledger)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.conn
            .lock()
            .map_err(|e| Error::Other(format!("Failed to lock ledger: {}", e)))
    }

    fn configure_pragmas(&self) -> Result<(), Error> {
        self.connection()?.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    /// Create the table when missing. Older layouts only stored the name
    /// column, so they are rebuilt with their names preserved.
    fn migrate_schema(&self) -> Result<(), Error> {
        let conn = self.connection()?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version < SCHEMA_VERSION {
            let has_table: Option<String> = conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'processed_items'",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            if has_table.is_some() {
                debug!("Schema version {} < {}, rebuilding processed_items", version, SCHEMA_VERSION);
                conn.execute_batch(
                    "ALTER TABLE processed_items RENAME TO processed_items_old;",
                )?;
                conn.execute_batch(include_str!("schema.sql"))?;
                let now = chrono::Utc::now().to_rfc3339();
                conn.execute(
                    "INSERT OR REPLACE INTO processed_items (path, processed_at) \
                     SELECT path, ?1 FROM processed_items_old",
                    params![now],
                )?;
                conn.execute_batch("DROP TABLE processed_items_old;")?;
            }
        }

        conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized (version {})", SCHEMA_VERSION);
        Ok(())
    }
}

impl Ledger for SqliteLedger {
    fn is_processed(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = self.connection()?.query_row(
            "SELECT count(*) FROM processed_items WHERE path = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn mark_processed(&self, name: &str) -> Result<(), Error> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection()?.execute(
            "INSERT OR REPLACE INTO processed_items (path, processed_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        Ok(())
    }

    fn count(&self) -> Result<usize, Error> {
        let count: i64 =
            self.connection()?
                .query_row("SELECT count(*) FROM processed_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn processed_names(&self) -> Result<Vec<String>, Error> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT path FROM processed_items ORDER BY path")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn clear(&self) -> Result<(), Error> {
        self.connection()?.execute("DELETE FROM processed_items", [])?;
        debug!("Ledger cleared");
        Ok(())
    }
}
