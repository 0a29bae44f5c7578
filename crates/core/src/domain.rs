use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp format digiKam writes into DATETIME text columns.
const DB_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a digiKam ISO-8601 timestamp column. Anything unparsable loads as `None`.
pub fn parse_db_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DB_DATETIME_FORMAT).ok()
}

/// Render a timestamp back into the column format.
pub fn format_db_datetime(value: NaiveDateTime) -> String {
    value.format(DB_DATETIME_FORMAT).to_string()
}

/// A storage volume/mount point under which albums live (`AlbumRoots` row).
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRoot {
    pub id: i64,
    pub label: Option<String>,
    pub status: i64,
    pub root_type: i64,
    /// Volume identifier, normally of the form `volumeid:?path=<mount>`.
    pub identifier: Option<String>,
    /// Base path below the mount point (`specificPath` column).
    pub specific_path: Option<String>,
}

/// A directory under an album root (`Albums` row).
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: i64,
    /// Owning root (`albumRoot` column). Nullable in stale databases.
    pub root_id: Option<i64>,
    /// Directory relative to the root (`relativePath` column), leading slash included.
    pub relative_path: String,
    pub date: Option<NaiveDate>,
    pub caption: Option<String>,
    pub collection: Option<String>,
    pub icon: Option<i64>,
}

/// A file entry (`Images` row).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub id: i64,
    /// Owning album (`album` column). Null once the album is gone.
    pub album_id: Option<i64>,
    pub name: String,
    pub status: i64,
    pub category: i64,
    /// `modificationDate`, parsed from ISO text.
    pub mtime: Option<NaiveDateTime>,
    /// `fileSize` in bytes.
    pub size: Option<i64>,
    /// `uniqueHash` content hash.
    pub unique_hash: Option<String>,
}

/// A hierarchical tag (`Tags` row); `parent_id` is the self-referential `pid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

/// Per-image picture properties (`ImageInformation` row, keyed by `imageid`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInformation {
    pub image_id: i64,
    pub rating: Option<i64>,
    pub creation_date: Option<NaiveDateTime>,
    pub digitization_date: Option<NaiveDateTime>,
    pub orientation: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub format: Option<String>,
}

/// Per-image camera metadata (`ImageMetadata` row, keyed by `imageid`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    pub image_id: i64,
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<f64>,
    pub focal_length: Option<f64>,
    pub focal_length_35: Option<f64>,
    pub exposure_time: Option<f64>,
    pub exposure_program: Option<i64>,
    pub exposure_mode: Option<i64>,
    pub sensitivity: Option<i64>,
    pub flash: Option<i64>,
    pub white_balance: Option<i64>,
    pub white_balance_color_temperature: Option<i64>,
    pub metering_mode: Option<i64>,
    pub subject_distance: Option<f64>,
    pub subject_distance_category: Option<i64>,
}

/// Per-video stream metadata (`VideoMetadata` row, keyed by `imageid`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadata {
    pub image_id: i64,
    pub aspect_ratio: Option<String>,
    pub audio_bit_rate: Option<String>,
    pub audio_channel_type: Option<String>,
    pub audio_compressor: Option<String>,
    pub duration: Option<String>,
    pub frame_rate: Option<String>,
    pub exposure_program: Option<i64>,
    pub video_codec: Option<String>,
}

/// A cached rendition in the thumbnail database (`Thumbnails` row, blob omitted).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailEntry {
    pub id: i64,
    pub thumb_type: Option<i64>,
    pub modification_date: Option<String>,
    pub orientation_hint: Option<i64>,
}
