use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{
    schema::TableSchema,
    traits::{Storage, StorageRead, StorageTx, StorageWrite},
};
use crate::record::Record;

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pub path: String,
    schema: TableSchema,
}

pub struct SqliteTx {
    conn: Connection,
    schema: TableSchema,
}

impl StorageTx for SqliteTx {
    fn commit(self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }
}

fn open_conn(path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(500))?;
    Ok(conn)
}

fn map_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        title: row.get(1)?,
        rating: row.get(2)?,
        reference_url: row.get(3)?,
    })
}

fn db_load_entry(
    conn: &Connection,
    schema: &TableSchema,
    id: i64,
) -> rusqlite::Result<Option<Record>> {
    conn.query_row(&schema.select_by_key_sql(), params![id], map_record_row)
        .optional()
}

fn db_list_entries(conn: &Connection, schema: &TableSchema) -> rusqlite::Result<Vec<Record>> {
    let mut stmt = conn.prepare(&schema.select_all_sql())?;
    let rows = stmt
        .query_map([], map_record_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_insert_entry(
    conn: &Connection,
    schema: &TableSchema,
    record: &Record,
) -> rusqlite::Result<()> {
    conn.execute(
        &schema.insert_sql(),
        params![
            record.id,
            record.title,
            record.rating,
            record.reference_url
        ],
    )?;
    Ok(())
}

impl StorageRead for SqliteTx {
    fn load_entry(&self, id: i64) -> Result<Option<Record>> {
        Ok(db_load_entry(&self.conn, &self.schema, id)?)
    }

    fn list_entries(&self) -> Result<Vec<Record>> {
        Ok(db_list_entries(&self.conn, &self.schema)?)
    }
}

impl StorageWrite for SqliteTx {
    fn insert_entry(&self, record: &Record) -> Result<()> {
        Ok(db_insert_entry(&self.conn, &self.schema, record)?)
    }
}

impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        let conn = open_conn(&self.path)?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        Ok(SqliteTx {
            conn,
            schema: self.schema,
        })
    }
}

impl SqliteStorage {
    /// Describes a store without touching it; call [`SqliteStorage::migrate`]
    /// before use.
    pub fn new<P: AsRef<Path>>(path: P, schema: TableSchema) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            schema,
        }
    }

    /// Brings the database up to the current schema version, creating the
    /// table when it is absent.
    pub fn migrate(&self) -> Result<()> {
        let conn = open_conn(&self.path)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            log::info!(
                "SQLite schema migration: {} -> {} ({})",
                version,
                DB_SCHEMA_VERSION,
                self.schema.name
            );
            // IF NOT EXISTS adopts a table left behind by an unversioned writer.
            conn.execute_batch(&self.schema.create_sql())?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        anyhow::bail!(
            "database schema version mismatch: found {version}, expected {DB_SCHEMA_VERSION}"
        )
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection, &TableSchema) -> rusqlite::Result<T>,
    {
        let conn = open_conn(&self.path)?;
        f(&conn, &self.schema)
    }
}

impl StorageRead for SqliteStorage {
    fn load_entry(&self, id: i64) -> Result<Option<Record>> {
        let row = self.with_conn(|conn, schema| db_load_entry(conn, schema, id))?;
        Ok(row)
    }

    fn list_entries(&self) -> Result<Vec<Record>> {
        let rows = self.with_conn(db_list_entries)?;
        Ok(rows)
    }
}
