use std::path::PathBuf;

use crate::domain::{Album, AlbumRoot, ImageEntry};
use crate::error::{Error, Result};

/// Prefix digiKam uses for path-based volume identifiers.
const VOLUME_PATH_PREFIX: &str = "volumeid:?path=";

/// Decode an album-root identifier into its mount path.
/// Returns `None` for identifiers that are not path-based (e.g. UUID form).
pub fn decode_identifier(identifier: &str) -> Option<&str> {
    identifier.strip_prefix(VOLUME_PATH_PREFIX)
}

/// Resolve the on-disk path of an album root: mount path + `specificPath`.
pub fn root_path(root: &AlbumRoot) -> Result<PathBuf> {
    let identifier = root.identifier.as_deref().unwrap_or_default();
    let mount = decode_identifier(identifier).ok_or_else(|| Error::UndecodableIdentifier {
        root_id: root.id,
        identifier: identifier.to_string(),
    })?;
    let specific = root.specific_path.as_deref().unwrap_or_default();
    Ok(PathBuf::from(format!("{mount}{specific}")))
}

/// Resolve the on-disk path of an album: root path + `relativePath`.
pub fn album_path(root: &AlbumRoot, album: &Album) -> Result<PathBuf> {
    let base = root_path(root)?;
    Ok(PathBuf::from(format!(
        "{}{}",
        base.display(),
        album.relative_path
    )))
}

/// Resolve the on-disk path of an image file.
pub fn image_path(root: &AlbumRoot, album: &Album, image: &ImageEntry) -> Result<PathBuf> {
    Ok(album_path(root, album)?.join(&image.name))
}
