pub mod schema;

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::*;
use crate::error::{Error, Result};

/// Access layer over the main digiKam database (albums, images, tags).
///
/// digiKam owns the schema and its migrations; `open` only validates that the
/// file looks like an album database and never alters the table layout.
#[derive(Debug)]
pub struct AlbumDb {
    conn: Connection,
}

impl AlbumDb {
    /// Open an existing digiKam album database.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        if !table_exists(&conn, "Images")? {
            return Err(Error::NotAlbumDatabase(path.to_path_buf()));
        }
        Ok(Self { conn })
    }

    /// Create a scratch album database with the digiKam table layout.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory album database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // ── Roots and albums ─────────────────────────────────────────────

    pub fn list_roots(&self) -> Result<Vec<AlbumRoot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, status, type, identifier, specificPath FROM AlbumRoots",
        )?;
        let roots = stmt
            .query_map([], |row| {
                Ok(AlbumRoot {
                    id: row.get(0)?,
                    label: row.get(1)?,
                    status: row.get(2)?,
                    root_type: row.get(3)?,
                    identifier: row.get(4)?,
                    specific_path: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roots)
    }

    pub fn list_albums(&self) -> Result<Vec<Album>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, albumRoot, relativePath, date, caption, collection, icon FROM Albums",
        )?;
        let albums = stmt
            .query_map([], |row| {
                Ok(Album {
                    id: row.get(0)?,
                    root_id: row.get(1)?,
                    relative_path: row.get(2)?,
                    date: row.get::<_, Option<NaiveDateWrapper>>(3).unwrap_or(None).map(|w| w.0),
                    caption: row.get(4)?,
                    collection: row.get(5)?,
                    icon: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    /// Roots keyed by id, for in-memory joins.
    pub fn roots_by_id(&self) -> Result<HashMap<i64, AlbumRoot>> {
        Ok(self.list_roots()?.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Albums keyed by id, for in-memory joins.
    pub fn albums_by_id(&self) -> Result<HashMap<i64, Album>> {
        Ok(self.list_albums()?.into_iter().map(|a| (a.id, a)).collect())
    }

    // ── Images ───────────────────────────────────────────────────────

    pub fn list_images(&self) -> Result<Vec<ImageEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, album, name, status, category, modificationDate, fileSize, uniqueHash
             FROM Images",
        )?;
        let images = stmt
            .query_map([], image_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(images)
    }

    pub fn image_by_id(&self, id: i64) -> Result<Option<ImageEntry>> {
        let image = self
            .conn
            .query_row(
                "SELECT id, album, name, status, category, modificationDate, fileSize, uniqueHash
                 FROM Images WHERE id = ?1",
                params![id],
                image_from_row,
            )
            .optional()?;
        Ok(image)
    }

    /// All images with a non-null modification time, ordered ascending by it.
    /// Rows whose timestamp text does not parse are skipped with a warning.
    pub fn images_by_mtime(&self) -> Result<Vec<(i64, chrono::NaiveDateTime)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, modificationDate FROM Images
             WHERE modificationDate IS NOT NULL
             ORDER BY modificationDate",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, raw) in rows {
            match parse_db_datetime(&raw) {
                Some(dt) => out.push((id, dt)),
                None => tracing::warn!(image = id, value = %raw, "skipping unparsable modificationDate"),
            }
        }
        Ok(out)
    }

    /// Delete images and their dependent rows (tag links, information,
    /// metadata) in a single transaction. Returns the number of image rows
    /// actually removed.
    pub fn delete_images(&mut self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut removed = 0usize;

        // Chunked to respect SQLite variable limits.
        for chunk in ids.chunks(500) {
            let placeholders: String = (1..=chunk.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(",");
            let params: Vec<&dyn rusqlite::types::ToSql> = chunk
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            for table in ["ImageTags", "ImageInformation", "ImageMetadata", "VideoMetadata"] {
                tx.execute(
                    &format!("DELETE FROM {table} WHERE imageid IN ({placeholders})"),
                    params.as_slice(),
                )?;
            }
            removed += tx.execute(
                &format!("DELETE FROM Images WHERE id IN ({placeholders})"),
                params.as_slice(),
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }

    // ── Side tables ──────────────────────────────────────────────────

    pub fn information_for(&self, image_id: i64) -> Result<Option<ImageInformation>> {
        let info = self
            .conn
            .query_row(
                "SELECT imageid, rating, creationDate, digitizationDate, orientation,
                        width, height, format
                 FROM ImageInformation WHERE imageid = ?1",
                params![image_id],
                |row| {
                    Ok(ImageInformation {
                        image_id: row.get(0)?,
                        rating: row.get(1)?,
                        creation_date: get_datetime(row, 2),
                        digitization_date: get_datetime(row, 3),
                        orientation: row.get(4)?,
                        width: row.get(5)?,
                        height: row.get(6)?,
                        format: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    pub fn metadata_for(&self, image_id: i64) -> Result<Option<ImageMetadata>> {
        let meta = self
            .conn
            .query_row(
                "SELECT imageid, make, model, lens, aperture, focalLength, focalLength35,
                        exposureTime, exposureProgram, exposureMode, sensitivity, flash,
                        whiteBalance, whiteBalanceColorTemperature, meteringMode,
                        subjectDistance, subjectDistanceCategory
                 FROM ImageMetadata WHERE imageid = ?1",
                params![image_id],
                |row| {
                    Ok(ImageMetadata {
                        image_id: row.get(0)?,
                        make: row.get(1)?,
                        model: row.get(2)?,
                        lens: row.get(3)?,
                        aperture: row.get(4)?,
                        focal_length: row.get(5)?,
                        focal_length_35: row.get(6)?,
                        exposure_time: row.get(7)?,
                        exposure_program: row.get(8)?,
                        exposure_mode: row.get(9)?,
                        sensitivity: row.get(10)?,
                        flash: row.get(11)?,
                        white_balance: row.get(12)?,
                        white_balance_color_temperature: row.get(13)?,
                        metering_mode: row.get(14)?,
                        subject_distance: row.get(15)?,
                        subject_distance_category: row.get(16)?,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }

    pub fn video_metadata_for(&self, image_id: i64) -> Result<Option<VideoMetadata>> {
        let meta = self
            .conn
            .query_row(
                "SELECT imageid, aspectRatio, audioBitRate, audioChannelType, audioCompressor,
                        duration, frameRate, exposureProgram, videoCodec
                 FROM VideoMetadata WHERE imageid = ?1",
                params![image_id],
                |row| {
                    Ok(VideoMetadata {
                        image_id: row.get(0)?,
                        aspect_ratio: row.get(1)?,
                        audio_bit_rate: row.get(2)?,
                        audio_channel_type: row.get(3)?,
                        audio_compressor: row.get(4)?,
                        duration: row.get(5)?,
                        frame_rate: row.get(6)?,
                        exposure_program: row.get(7)?,
                        video_codec: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }

    // ── Tags ─────────────────────────────────────────────────────────

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare("SELECT id, pid, name FROM Tags ORDER BY id")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// First tag with the given name, anywhere in the hierarchy.
    pub fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, pid, name FROM Tags WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Tag with the given name directly under `parent_id` (None = top level).
    pub fn find_tag(&self, parent_id: Option<i64>, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, pid, name FROM Tags WHERE pid IS ?1 AND name = ?2",
                params![parent_id, name],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Create a tag under an optional parent. The (parent, name) pair must be
    /// unique; SQLite's UNIQUE does not cover NULL parents, so the check is
    /// explicit.
    pub fn create_tag(&self, parent_id: Option<i64>, name: &str) -> Result<Tag> {
        if self.find_tag(parent_id, name)?.is_some() {
            return Err(Error::TagExists(name.to_string()));
        }
        self.conn.execute(
            "INSERT INTO Tags (pid, name) VALUES (?1, ?2)",
            params![parent_id, name],
        )?;
        Ok(Tag {
            id: self.conn.last_insert_rowid(),
            parent_id,
            name: name.to_string(),
        })
    }

    pub fn tags_for_image(&self, image_id: i64) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.pid, t.name FROM Tags t
             JOIN ImageTags it ON it.tagid = t.id
             WHERE it.imageid = ?1
             ORDER BY t.id",
        )?;
        let tags = stmt
            .query_map(params![image_id], tag_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// tag id → number of images carrying it.
    pub fn tag_image_counts(&self) -> Result<HashMap<i64, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tagid, COUNT(*) FROM ImageTags GROUP BY tagid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }

    /// Attach a tag to one image. Returns false if the link already existed.
    pub fn attach_tag(&self, image_id: i64, tag_id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO ImageTags (imageid, tagid) VALUES (?1, ?2)",
            params![image_id, tag_id],
        )?;
        Ok(changed == 1)
    }

    /// Attach a tag to many images in one transaction. Returns the number of
    /// links newly created (existing links are left alone).
    pub fn attach_tag_batch(&mut self, tag_id: i64, image_ids: &[i64]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut attached = 0usize;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO ImageTags (imageid, tagid) VALUES (?1, ?2)")?;
            for &image_id in image_ids {
                attached += stmt.execute(params![image_id, tag_id])?;
            }
        }
        tx.commit()?;
        Ok(attached)
    }

    // ── Counts ───────────────────────────────────────────────────────

    /// All album-database row counts in a single query.
    pub fn counts(&self) -> Result<AlbumCounts> {
        let counts = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM AlbumRoots),
                (SELECT COUNT(*) FROM Albums),
                (SELECT COUNT(*) FROM Images),
                (SELECT COUNT(*) FROM Tags),
                (SELECT COUNT(*) FROM ImageTags)",
            [],
            |row| {
                Ok(AlbumCounts {
                    roots: row.get::<_, i64>(0)? as usize,
                    albums: row.get::<_, i64>(1)? as usize,
                    images: row.get::<_, i64>(2)? as usize,
                    tags: row.get::<_, i64>(3)? as usize,
                    image_tags: row.get::<_, i64>(4)? as usize,
                })
            },
        )?;
        Ok(counts)
    }

    // ── Scratch-database seeding ─────────────────────────────────────
    //
    // Row creation is digiKam's job for real libraries; these exist for the
    // bootstrap surface (scratch databases, tests, the association demo).

    pub fn insert_root(&self, root: &AlbumRoot) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO AlbumRoots (label, status, type, identifier, specificPath)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                root.label,
                root.status,
                root.root_type,
                root.identifier,
                root.specific_path
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_album(&self, album: &Album) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO Albums (albumRoot, relativePath, date, caption, collection, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                album.root_id,
                album.relative_path,
                album.date.map(|d| d.to_string()),
                album.caption,
                album.collection,
                album.icon
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_image(&self, image: &ImageEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO Images (album, name, status, category, modificationDate, fileSize, uniqueHash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                image.album_id,
                image.name,
                image.status,
                image.category,
                image.mtime.map(format_db_datetime),
                image.size,
                image.unique_hash
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_information(&self, info: &ImageInformation) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ImageInformation
                (imageid, rating, creationDate, digitizationDate, orientation, width, height, format)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                info.image_id,
                info.rating,
                info.creation_date.map(format_db_datetime),
                info.digitization_date.map(format_db_datetime),
                info.orientation,
                info.width,
                info.height,
                info.format
            ],
        )?;
        Ok(())
    }

    pub fn insert_metadata(&self, meta: &ImageMetadata) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ImageMetadata
                (imageid, make, model, lens, aperture, focalLength, focalLength35,
                 exposureTime, exposureProgram, exposureMode, sensitivity, flash,
                 whiteBalance, whiteBalanceColorTemperature, meteringMode,
                 subjectDistance, subjectDistanceCategory)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                meta.image_id,
                meta.make,
                meta.model,
                meta.lens,
                meta.aperture,
                meta.focal_length,
                meta.focal_length_35,
                meta.exposure_time,
                meta.exposure_program,
                meta.exposure_mode,
                meta.sensitivity,
                meta.flash,
                meta.white_balance,
                meta.white_balance_color_temperature,
                meta.metering_mode,
                meta.subject_distance,
                meta.subject_distance_category
            ],
        )?;
        Ok(())
    }

    pub fn insert_video_metadata(&self, meta: &VideoMetadata) -> Result<()> {
        self.conn.execute(
            "INSERT INTO VideoMetadata
                (imageid, aspectRatio, audioBitRate, audioChannelType, audioCompressor,
                 duration, frameRate, exposureProgram, videoCodec)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                meta.image_id,
                meta.aspect_ratio,
                meta.audio_bit_rate,
                meta.audio_channel_type,
                meta.audio_compressor,
                meta.duration,
                meta.frame_rate,
                meta.exposure_program,
                meta.video_codec
            ],
        )?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn image_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageEntry> {
    Ok(ImageEntry {
        id: row.get(0)?,
        album_id: row.get(1)?,
        name: row.get(2)?,
        status: row.get(3)?,
        category: row.get(4)?,
        mtime: get_datetime(row, 5),
        size: row.get(6)?,
        unique_hash: row.get(7)?,
    })
}

fn tag_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        name: row.get(2)?,
    })
}

/// Read a DATETIME text column, tolerating nulls, non-text values, and
/// unparsable text (all load as `None`, matching how the rest of the library
/// treats stale timestamp columns).
fn get_datetime(row: &rusqlite::Row<'_>, idx: usize) -> Option<chrono::NaiveDateTime> {
    row.get::<_, Option<String>>(idx)
        .unwrap_or(None)
        .as_deref()
        .and_then(parse_db_datetime)
}

/// Wrapper so album dates survive both DATE text and anything stale.
struct NaiveDateWrapper(chrono::NaiveDate);

impl rusqlite::types::FromSql for NaiveDateWrapper {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse::<chrono::NaiveDate>()
            .map(NaiveDateWrapper)
            .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
    }
}

/// Row counts for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumCounts {
    pub roots: usize,
    pub albums: usize,
    pub images: usize,
    pub tags: usize,
    pub image_tags: usize,
}
