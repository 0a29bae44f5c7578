use std::collections::HashMap;
use std::fmt;

use crate::domain::{Album, AlbumRoot, ImageEntry};
use crate::paths;

/// Why an image record was judged unresolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanReason {
    /// The `album` column is null or names no existing album.
    MissingAlbum,
    /// The album's `albumRoot` names no existing root.
    MissingRoot,
    /// The root's identifier is not of the `volumeid:?path=` form.
    UndecodableIdentifier,
    /// The resolved path names no file on disk (verify-files mode only).
    FileMissing,
}

impl fmt::Display for OrphanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrphanReason::MissingAlbum => "album missing",
            OrphanReason::MissingRoot => "album root missing",
            OrphanReason::UndecodableIdentifier => "undecodable root identifier",
            OrphanReason::FileMissing => "file missing on disk",
        };
        f.write_str(s)
    }
}

/// Judge a single image against the loaded album/root maps.
/// Returns `None` when the image's path chain resolves.
pub fn classify(
    image: &ImageEntry,
    albums: &HashMap<i64, Album>,
    roots: &HashMap<i64, AlbumRoot>,
) -> Option<OrphanReason> {
    let album = image.album_id.and_then(|id| albums.get(&id));
    let Some(album) = album else {
        return Some(OrphanReason::MissingAlbum);
    };
    let root = album.root_id.and_then(|id| roots.get(&id));
    let Some(root) = root else {
        return Some(OrphanReason::MissingRoot);
    };
    if paths::root_path(root).is_err() {
        return Some(OrphanReason::UndecodableIdentifier);
    }
    None
}

/// Result of an orphan-cleanup pass.
#[derive(Debug, Clone)]
pub struct OrphanReport {
    /// Total image rows examined.
    pub examined: usize,
    /// Orphaned image ids with the reason each was flagged.
    pub orphans: Vec<(i64, OrphanReason)>,
    /// Rows actually deleted (0 on a dry run).
    pub deleted: usize,
}
