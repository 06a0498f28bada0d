//! Viewer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four viewer data-access operations over the `viewer` table.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Any string is a valid `userID`; the only failures are storage errors.
//! - `upsert_all` and `replace_all_with` are all-or-nothing.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::viewer::{Viewer, ViewerId, ViewerValidationError};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use thiserror::Error;

const VIEWER_TABLE: &str = "viewer";
const VIEWER_COLUMNS: [&str; 5] = [
    "userID",
    "name",
    "username",
    "profileImageURL",
    "intercomHash",
];

const VIEWER_COLUMN_LIST: &str = "userID, name, username, profileImageURL, intercomHash";
const VIEWER_SELECT_SQL: &str =
    "SELECT userID, name, username, profileImageURL, intercomHash FROM viewer";
const LOAD_BY_IDS_CHUNK_SIZE: usize = 500;

const VIEWER_UPSERT_SQL: &str = "INSERT INTO viewer (
    userID,
    name,
    username,
    profileImageURL,
    intercomHash
) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(userID) DO UPDATE SET
    name = excluded.name,
    username = excluded.username,
    profileImageURL = excluded.profileImageURL,
    intercomHash = excluded.intercomHash;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for viewer persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ViewerValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("viewer not found: {0}")]
    NotFound(ViewerId),
    /// Connection schema is not at the expected migrated version.
    #[error(
        "connection schema version {actual_version} does not match expected {expected_version}"
    )]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table is missing: {0}")]
    MissingRequiredTable(&'static str),
    #[error("required column is missing: {table}.{column}")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for viewer storage.
pub trait ViewerRepository {
    /// Returns every stored viewer in first-insert order.
    fn get_all(&self) -> RepoResult<Vec<Viewer>>;
    /// Returns stored viewers whose id is in `ids`, in first-insert order.
    fn load_by_ids(&self, ids: &BTreeSet<ViewerId>) -> RepoResult<Vec<Viewer>>;
    /// Inserts or fully replaces each viewer, keyed by `user_id`.
    fn upsert_all(&self, viewers: &[Viewer]) -> RepoResult<()>;
    /// Removes the stored row with `user_id`.
    fn delete_by_id(&self, user_id: &str) -> RepoResult<()>;
    /// Atomically removes every other viewer and upserts `viewer`.
    ///
    /// Returns how many other viewers were removed.
    fn replace_all_with(&self, viewer: &Viewer) -> RepoResult<usize>;

    /// Removes the stored row matching `viewer.user_id`.
    fn delete(&self, viewer: &Viewer) -> RepoResult<()> {
        self.delete_by_id(&viewer.user_id)
    }
}

/// SQLite-backed viewer repository.
pub struct SqliteViewerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteViewerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_viewer_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ViewerRepository for SqliteViewerRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Viewer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VIEWER_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut viewers = Vec::new();

        while let Some(row) = rows.next()? {
            viewers.push(parse_viewer_row(row)?);
        }

        Ok(viewers)
    }

    fn load_by_ids(&self, ids: &BTreeSet<ViewerId>) -> RepoResult<Vec<Viewer>> {
        let ids: Vec<&ViewerId> = ids.iter().collect();
        let mut ranked: Vec<(i64, Viewer)> = Vec::new();

        // SQLite caps bound variables per statement.
        for chunk in ids.chunks(LOAD_BY_IDS_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "SELECT rowid, {VIEWER_COLUMN_LIST}
                 FROM viewer
                 WHERE userID IN ({placeholders});"
            ))?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;

            while let Some(row) = rows.next()? {
                ranked.push((row.get::<_, i64>(0)?, parse_viewer_row(row)?));
            }
        }

        ranked.sort_by_key(|(rowid, _)| *rowid);
        Ok(ranked.into_iter().map(|(_, viewer)| viewer).collect())
    }

    fn upsert_all(&self, viewers: &[Viewer]) -> RepoResult<()> {
        if viewers.is_empty() {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;
        upsert_viewers(&tx, viewers)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_by_id(&self, user_id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM viewer WHERE userID = ?1;", [user_id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(user_id.to_string()));
        }

        Ok(())
    }

    fn replace_all_with(&self, viewer: &Viewer) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM viewer WHERE userID != ?1;",
            [viewer.user_id.as_str()],
        )?;
        upsert_viewers(&tx, std::slice::from_ref(viewer))?;
        tx.commit()?;

        Ok(removed)
    }
}

fn upsert_viewers(conn: &Connection, viewers: &[Viewer]) -> RepoResult<()> {
    let mut stmt = conn.prepare(VIEWER_UPSERT_SQL)?;
    for viewer in viewers {
        stmt.execute(params![
            viewer.user_id.as_str(),
            viewer.name.as_str(),
            viewer.username.as_str(),
            viewer.profile_image_url.as_deref(),
            viewer.intercom_hash.as_deref(),
        ])?;
    }
    Ok(())
}

fn parse_viewer_row(row: &Row<'_>) -> rusqlite::Result<Viewer> {
    Ok(Viewer {
        user_id: row.get("userID")?,
        name: row.get("name")?,
        username: row.get("username")?,
        profile_image_url: row.get("profileImageURL")?,
        intercom_hash: row.get("intercomHash")?,
    })
}

fn ensure_viewer_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, VIEWER_TABLE)? {
        return Err(RepoError::MissingRequiredTable(VIEWER_TABLE));
    }

    for column in VIEWER_COLUMNS {
        if !table_has_column(conn, VIEWER_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: VIEWER_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
