use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::{LibrarySummary, SourceRecord};
use crate::model::{Corpus, NidEntry};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed store of imported NID records.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Recording imported source files and their records in one transaction.
/// - Reading records back, flat or grouped into a `Corpus`.
#[derive(Debug)]
pub struct EntryDb {
    conn: Connection,
}

impl EntryDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in `PRAGMA user_version`.
    pub fn schema_version(&self) -> DbResult<i32> {
        current_schema_version(&self.conn)
    }

    /// Record a source file together with its records, atomically.
    ///
    /// Either the source row and every record are stored, or nothing is:
    /// a source row never exists without its records. Returns the number of
    /// records stored.
    pub fn import_source(&self, record: &SourceRecord, entries: &[NidEntry]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO sources (path, version, sha256, imported_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.path, record.version, record.sha256, record.imported_at],
        )?;
        let source_id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO nid_entries (source_id, library, module, version, nid, name)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for entry in entries {
                stmt.execute(params![
                    source_id,
                    entry.library,
                    entry.module,
                    entry.version,
                    entry.nid,
                    entry.name
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// Find a previously imported source by content hash and version.
    pub fn find_source(&self, sha256: &str, version: &str) -> DbResult<Option<SourceRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT path, version, sha256, imported_at
                FROM sources
                WHERE sha256 = ?1 AND version = ?2
                "#,
                params![sha256, version],
                map_source,
            )
            .optional()?;
        Ok(record)
    }

    /// List all imported sources (ordered by id).
    pub fn list_sources(&self) -> DbResult<Vec<SourceRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT path, version, sha256, imported_at
            FROM sources
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_source)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Load records, optionally restricted to one library (ordered by id).
    pub fn load_entries(&self, library: Option<&str>) -> DbResult<Vec<NidEntry>> {
        fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<NidEntry> {
            Ok(NidEntry {
                nid: row.get(0)?,
                name: row.get(1)?,
                library: row.get(2)?,
                module: row.get(3)?,
                version: row.get(4)?,
            })
        }

        let mut stmt = if library.is_some() {
            self.conn.prepare(
                r#"
                SELECT nid, name, library, module, version
                FROM nid_entries
                WHERE library = ?1
                ORDER BY id
                "#,
            )?
        } else {
            self.conn.prepare(
                r#"
                SELECT nid, name, library, module, version
                FROM nid_entries
                ORDER BY id
                "#,
            )?
        };

        let rows = if let Some(lib) = library {
            stmt.query_map(params![lib], map_entry)?
        } else {
            stmt.query_map([], map_entry)?
        };

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Group stored records into a corpus.
    pub fn load_corpus(&self, library: Option<&str>) -> DbResult<Corpus> {
        let entries = self.load_entries(library)?;
        Ok(Corpus::from_entries(&entries))
    }

    /// Per-library version and record counts (ordered by library name).
    ///
    /// The module reported is the one seen at the library's newest version.
    pub fn list_libraries(&self) -> DbResult<Vec<LibrarySummary>> {
        let corpus = self.load_corpus(None)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT library, COUNT(*)
            FROM nid_entries
            GROUP BY library
            ORDER BY library
            "#,
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut out = Vec::new();
        for row in rows {
            let (library, count) = row?;
            let (module, versions) = corpus
                .get(&library)
                .map(|h| (h.module.clone(), h.snapshots.len()))
                .unwrap_or_default();
            out.push(LibrarySummary {
                library,
                module,
                versions,
                entries: usize::try_from(count).unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Total number of stored records.
    pub fn count_entries(&self) -> DbResult<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM nid_entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn map_source(row: &rusqlite::Row<'_>) -> rusqlite::Result<SourceRecord> {
    Ok(SourceRecord {
        path: row.get(0)?,
        version: row.get(1)?,
        sha256: row.get(2)?,
        imported_at: row.get(3)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (sources, nid_entries)
/// - 2: lookup indexes on nid_entries and sources
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS sources (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                path        TEXT NOT NULL,
                version     TEXT NOT NULL,
                sha256      TEXT NOT NULL,
                imported_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS nid_entries (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id INTEGER NOT NULL REFERENCES sources(id),
                library   TEXT NOT NULL,
                module    TEXT NOT NULL,
                version   TEXT NOT NULL,
                nid       TEXT NOT NULL,
                name      TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE INDEX IF NOT EXISTS idx_nid_entries_library ON nid_entries(library, version);
            CREATE INDEX IF NOT EXISTS idx_nid_entries_nid ON nid_entries(nid);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sources_sha_version ON sources(sha256, version);

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
