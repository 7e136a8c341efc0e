//! The package ledger.
//!
//! A SQLite database recording which packages are installed where. Rows
//! are keyed by the fingerprint of the install path. The filesystem is the
//! source of truth: a row whose directory has disappeared is deleted the
//! next time [`Ledger::is_added`] looks at it.
//!
//! The same database holds the repository table, so repository ids stay
//! stable across runs.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use thiserror::Error;

use crate::core::package::ResolvedPackage;
use crate::core::repository::RepositoryDescriptor;
use crate::util::config::SourceEntry;
use crate::util::hash::Fingerprint;

/// Failure talking to the ledger database.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open package database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize package database schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to {op}: {source}")]
    Statement {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("package record {id} already exists")]
    Duplicate { id: String },
}

fn statement(op: &'static str) -> impl Fn(rusqlite::Error) -> LedgerError {
    move |source| LedgerError::Statement { op, source }
}

/// One installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub repository: i64,
}

/// Handle to the ledger database. One connection per process.
#[derive(Debug)]
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LedgerError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|source| LedgerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Opened package database {}", path.display());
        Self::from_connection(conn)
    }

    /// An in-memory ledger, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory().map_err(|source| LedgerError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id TEXT PRIMARY KEY,
                name TEXT,
                version TEXT,
                repository INTEGER
            );
            CREATE TABLE IF NOT EXISTS repositories (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                url TEXT NOT NULL,
                cache TEXT NOT NULL DEFAULT '',
                priority INTEGER NOT NULL DEFAULT 100
            );
            "#,
        )
        .map_err(LedgerError::Schema)?;

        Ok(Ledger { conn })
    }

    /// Record `package` as installed under `id`.
    ///
    /// A second insert for the same fingerprint is an error.
    pub fn insert(&self, id: &Fingerprint, package: &ResolvedPackage) -> Result<(), LedgerError> {
        let result = self.conn.execute(
            "INSERT INTO packages (id, name, version, repository) VALUES (?1, ?2, ?3, ?4)",
            params![
                id.as_str(),
                package.name,
                package.version,
                package.repository_id
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Recorded {} as {}", package, id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(LedgerError::Duplicate {
                    id: id.to_string(),
                })
            }
            Err(source) => Err(LedgerError::Statement {
                op: "insert package",
                source,
            }),
        }
    }

    /// Whether a record with this fingerprint exists.
    pub fn contains(&self, id: &Fingerprint) -> Result<bool, LedgerError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM packages WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(statement("query package"))?;
        Ok(found.is_some())
    }

    pub fn get(&self, id: &Fingerprint) -> Result<Option<LedgerRecord>, LedgerError> {
        self.conn
            .query_row(
                "SELECT id, name, version, repository FROM packages WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(LedgerRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        version: row.get(2)?,
                        repository: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(statement("query package"))
    }

    /// Remove a record. Returns whether one existed.
    pub fn delete(&self, id: &Fingerprint) -> Result<bool, LedgerError> {
        let removed = self
            .conn
            .execute("DELETE FROM packages WHERE id = ?1", params![id.as_str()])
            .map_err(statement("delete package"))?;

        if removed > 0 {
            tracing::debug!("Deleted package record {}", id);
        }
        Ok(removed > 0)
    }

    /// All records, ordered by name.
    pub fn list(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, version, repository FROM packages ORDER BY name, id")
            .map_err(statement("list packages"))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LedgerRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    version: row.get(2)?,
                    repository: row.get(3)?,
                })
            })
            .map_err(statement("list packages"))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(statement("list packages"))
    }

    /// Whether a package is installed at `path`.
    ///
    /// True only when the path exists on disk and the ledger has its
    /// fingerprint. A record whose path is gone is deleted.
    pub fn is_added(&self, path: &Path) -> Result<bool, LedgerError> {
        let id = Fingerprint::of_path(path);
        let exists = path.exists();
        let recorded = self.contains(&id)?;

        match (exists, recorded) {
            (true, true) => Ok(true),
            (false, true) => {
                tracing::warn!(
                    "{} is recorded as installed but missing on disk, removing record",
                    path.display()
                );
                self.delete(&id)?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    /// Make the repository table match `sources`, returning descriptors
    /// in the given order.
    ///
    /// Known names keep their id and cache path; url and priority are
    /// refreshed. Rows for names not in `sources` are left alone.
    pub fn sync_repositories(
        &mut self,
        sources: &[(&str, &SourceEntry)],
    ) -> Result<Vec<RepositoryDescriptor>, LedgerError> {
        let tx = self
            .conn
            .transaction()
            .map_err(statement("begin repository sync"))?;

        let mut descriptors = Vec::with_capacity(sources.len());
        for (name, source) in sources {
            tx.execute(
                "INSERT INTO repositories (name, url, priority) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET url = excluded.url, priority = excluded.priority",
                params![name, source.url, source.priority],
            )
            .map_err(statement("sync repository"))?;

            let descriptor = tx
                .query_row(
                    "SELECT id, name, url, cache FROM repositories WHERE name = ?1",
                    params![name],
                    repository_from_row,
                )
                .map_err(statement("sync repository"))?;
            descriptors.push(descriptor);
        }

        tx.commit().map_err(statement("commit repository sync"))?;
        Ok(descriptors)
    }

    /// All known repositories, by priority then name.
    pub fn repositories(&self) -> Result<Vec<RepositoryDescriptor>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, url, cache FROM repositories ORDER BY priority, name")
            .map_err(statement("list repositories"))?;

        let rows = stmt
            .query_map([], repository_from_row)
            .map_err(statement("list repositories"))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(statement("list repositories"))
    }

    /// Record where a repository's index has been cached.
    pub fn update_repository_cache(&self, id: i64, cache: &str) -> Result<(), LedgerError> {
        self.conn
            .execute(
                "UPDATE repositories SET cache = ?1 WHERE id = ?2",
                params![cache, id],
            )
            .map_err(statement("update repository cache"))?;
        Ok(())
    }
}

fn repository_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepositoryDescriptor> {
    Ok(RepositoryDescriptor {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        cache: row.get(3)?,
    })
}
