use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("database file does not exist: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("not a digiKam album database (no Images table): {}", .0.display())]
    NotAlbumDatabase(PathBuf),

    #[error("not a digiKam thumbnail database (no Thumbnails table): {}", .0.display())]
    NotThumbnailDatabase(PathBuf),

    #[error("cannot decode identifier {identifier:?} of album root {root_id}")]
    UndecodableIdentifier { root_id: i64, identifier: String },

    #[error("image not found: {0}")]
    ImageNotFound(i64),

    #[error("tag not found: {0} — create it first or pass --create-tag")]
    TagNotFound(String),

    #[error("tag already exists under the same parent: {0}")]
    TagExists(String),

    #[error("missing setting {0} — set it in the config file or pass the matching flag")]
    MissingSetting(&'static str),

    #[error("config file does not exist: {}", .0.display())]
    ConfigNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
