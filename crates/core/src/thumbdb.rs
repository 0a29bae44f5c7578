use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::ThumbnailEntry;
use crate::error::{Error, Result};

/// Access layer over the digiKam thumbnail cache database.
///
/// The cache lives in its own SQLite file (`thumbnails-digikam.db`): a
/// `Thumbnails` table holding the rendition blobs and a `FilePaths` table
/// keying each thumbnail to the file it renders.
#[derive(Debug)]
pub struct ThumbDb {
    conn: Connection,
}

impl ThumbDb {
    /// Open an existing thumbnail database.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'Thumbnails'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(Error::NotThumbnailDatabase(path.to_path_buf()));
        }
        Ok(Self { conn })
    }

    /// Create a scratch thumbnail database with the digiKam table layout.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory thumbnail database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize(&conn)?;
        Ok(Self { conn })
    }

    /// All `(thumbnail id, file path)` pairs, via the `FilePaths` join.
    pub fn list_file_paths(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, fp.path FROM Thumbnails t
             JOIN FilePaths fp ON fp.thumbId = t.id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn thumbnail_by_id(&self, id: i64) -> Result<Option<ThumbnailEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, type, modificationDate, orientationHint FROM Thumbnails WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ThumbnailEntry {
                        id: row.get(0)?,
                        thumb_type: row.get(1)?,
                        modification_date: row.get(2)?,
                        orientation_hint: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Delete thumbnails and their path keys in a single transaction.
    /// Returns the number of thumbnail rows removed.
    pub fn delete_thumbnails(&mut self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut removed = 0usize;

        for chunk in ids.chunks(500) {
            let placeholders: String = (1..=chunk.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(",");
            let params: Vec<&dyn rusqlite::types::ToSql> = chunk
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            tx.execute(
                &format!("DELETE FROM FilePaths WHERE thumbId IN ({placeholders})"),
                params.as_slice(),
            )?;
            removed += tx.execute(
                &format!("DELETE FROM Thumbnails WHERE id IN ({placeholders})"),
                params.as_slice(),
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Thumbnails", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Seed a thumbnail keyed to `path` (scratch databases and tests).
    pub fn insert_thumbnail(&self, path: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO Thumbnails (type, modificationDate, orientationHint, data)
             VALUES (1, NULL, NULL, x'00')",
            [],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn.execute(
            "INSERT INTO FilePaths (path, thumbId) VALUES (?1, ?2)",
            params![path, id],
        )?;
        Ok(id)
    }
}

fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS Thumbnails (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            type             INTEGER,
            modificationDate TEXT,
            orientationHint  INTEGER,
            data             BLOB
        );

        CREATE TABLE IF NOT EXISTS FilePaths (
            path    TEXT PRIMARY KEY,
            thumbId INTEGER
        );
        ",
    )?;
    Ok(())
}
