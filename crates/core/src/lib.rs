pub mod albumdb;
pub mod bursts;
pub mod config;
pub mod domain;
pub mod error;
pub mod orphans;
pub mod paths;
pub mod thumbdb;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use albumdb::{AlbumCounts, AlbumDb};
use bursts::BurstReport;
use domain::*;
use error::{Error, Result};
use orphans::{OrphanReason, OrphanReport};
use thumbdb::ThumbDb;

/// Callback events for the orphan-cleanup pass.
pub enum OrphanProgress {
    /// Starting the pass over all image rows.
    Start { total: usize },
    /// An image has been judged.
    Examined {
        id: i64,
        orphan: Option<OrphanReason>,
    },
    /// Pass completed.
    Complete { deleted: usize },
}

/// Options for the orphan-cleanup pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanOptions {
    /// Report orphans without deleting anything.
    pub dry_run: bool,
    /// Additionally treat images whose resolved path names no file as orphans.
    pub verify_files: bool,
}

/// Options for the burst-tagging pass.
#[derive(Debug, Clone)]
pub struct BurstOptions {
    /// Maximum gap between consecutive shots, in seconds.
    pub threshold_secs: i64,
    /// Tag applied to burst members.
    pub tag: String,
    /// Create the tag at the top level if it does not exist.
    pub create_tag: bool,
    /// Report flagged images without tagging.
    pub dry_run: bool,
}

/// Result of a thumbnail-cleanup pass.
#[derive(Debug, Clone)]
pub struct ThumbReport {
    /// Thumbnail/path pairs examined.
    pub examined: usize,
    /// `(thumbnail id, path)` pairs outside the collection prefix.
    pub stale: Vec<(i64, String)>,
    /// Rows actually deleted (0 on a dry run).
    pub deleted: usize,
}

/// Row counts for the status report.
#[derive(Debug, Clone, Copy)]
pub struct LibraryStats {
    pub albums: AlbumCounts,
    /// None when no thumbnail database is configured.
    pub thumbnails: Option<usize>,
}

/// Everything known about one image, for the inspect view.
#[derive(Debug, Clone)]
pub struct ImageDetails {
    pub image: ImageEntry,
    pub album: Option<Album>,
    pub root: Option<AlbumRoot>,
    /// Resolved on-disk path; None while the album/root chain is broken.
    pub path: Option<PathBuf>,
    pub information: Option<ImageInformation>,
    pub metadata: Option<ImageMetadata>,
    pub video_metadata: Option<VideoMetadata>,
    pub tags: Vec<Tag>,
}

/// A tag with its display context, for the tags listing.
#[derive(Debug, Clone)]
pub struct TagOverview {
    pub tag: Tag,
    pub parent_name: Option<String>,
    pub image_count: usize,
}

/// The main entry point: both digiKam databases plus the maintenance passes.
#[derive(Debug)]
pub struct Library {
    album_db: AlbumDb,
    thumb_db: Option<ThumbDb>,
}

impl Library {
    /// Open an existing digiKam library. The thumbnail database is optional;
    /// passes that need it fail with the missing-setting error.
    pub fn open(album_db_path: &Path, thumb_db_path: Option<&Path>) -> Result<Self> {
        let album_db = AlbumDb::open(album_db_path)?;
        let thumb_db = thumb_db_path.map(ThumbDb::open).transpose()?;
        Ok(Self { album_db, thumb_db })
    }

    /// Assemble a library from already-open databases (scratch/test setups).
    pub fn from_parts(album_db: AlbumDb, thumb_db: Option<ThumbDb>) -> Self {
        Self { album_db, thumb_db }
    }

    pub fn album_db(&self) -> &AlbumDb {
        &self.album_db
    }

    /// Row counts across both databases.
    pub fn status(&self) -> Result<LibraryStats> {
        Ok(LibraryStats {
            albums: self.album_db.counts()?,
            thumbnails: self.thumb_db.as_ref().map(|db| db.count()).transpose()?,
        })
    }

    /// Remove image records whose album/root chain no longer resolves,
    /// cascading to tag links and metadata rows. One transaction, committed
    /// once at the end.
    pub fn clean_orphans(
        &mut self,
        opts: &OrphanOptions,
        mut progress_cb: Option<&mut dyn FnMut(OrphanProgress)>,
    ) -> Result<OrphanReport> {
        let roots = self.album_db.roots_by_id()?;
        let albums = self.album_db.albums_by_id()?;
        let images = self.album_db.list_images()?;

        if let Some(ref mut cb) = progress_cb {
            cb(OrphanProgress::Start {
                total: images.len(),
            });
        }

        // Verify-files mode sweeps each resolvable root once up front. Roots
        // whose mount directory is absent are skipped: an unmounted volume
        // must not read as a mass deletion.
        let (on_disk, verified_roots) = if opts.verify_files {
            self.sweep_roots(&roots)?
        } else {
            (HashSet::new(), HashSet::new())
        };

        let mut orphans: Vec<(i64, OrphanReason)> = Vec::new();
        for image in &images {
            let mut verdict = orphans::classify(image, &albums, &roots);

            if verdict.is_none() && opts.verify_files {
                // classify() already proved the chain exists and decodes.
                let album = image.album_id.and_then(|id| albums.get(&id));
                let root = album.and_then(|a| a.root_id).and_then(|id| roots.get(&id));
                if let (Some(album), Some(root)) = (album, root) {
                    if verified_roots.contains(&root.id) {
                        let path = paths::image_path(root, album, image)?;
                        if !on_disk.contains(&path) {
                            verdict = Some(OrphanReason::FileMissing);
                        }
                    }
                }
            }

            if let Some(reason) = verdict {
                debug!(image = image.id, name = %image.name, %reason, "orphaned image");
                orphans.push((image.id, reason));
            }
            if let Some(ref mut cb) = progress_cb {
                cb(OrphanProgress::Examined {
                    id: image.id,
                    orphan: verdict,
                });
            }
        }

        let deleted = if opts.dry_run {
            info!(
                orphans = orphans.len(),
                "dry run — leaving orphaned images in place"
            );
            0
        } else {
            let ids: Vec<i64> = orphans.iter().map(|(id, _)| *id).collect();
            self.album_db.delete_images(&ids)?
        };

        if let Some(ref mut cb) = progress_cb {
            cb(OrphanProgress::Complete { deleted });
        }

        info!(
            examined = images.len(),
            orphans = orphans.len(),
            deleted,
            "orphan cleanup finished"
        );
        Ok(OrphanReport {
            examined: images.len(),
            orphans,
            deleted,
        })
    }

    /// Walk every decodable album root and collect the files that exist.
    /// Returns the file set and the ids of roots that could be swept.
    fn sweep_roots(
        &self,
        roots: &HashMap<i64, AlbumRoot>,
    ) -> Result<(HashSet<PathBuf>, HashSet<i64>)> {
        let mut files = HashSet::new();
        let mut verified = HashSet::new();

        for root in roots.values() {
            let base = match paths::root_path(root) {
                Ok(base) => base,
                Err(_) => continue, // undecodable roots are handled by classify()
            };
            if !base.is_dir() {
                warn!(root = root.id, path = %base.display(), "root directory not mounted, skipping file verification");
                continue;
            }
            for entry in WalkDir::new(&base).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    files.insert(entry.into_path());
                }
            }
            verified.insert(root.id);
        }

        Ok((files, verified))
    }

    /// Remove cached thumbnails whose file path does not fall under `prefix`.
    /// One transaction, committed once at the end.
    pub fn clean_thumbnails(&mut self, prefix: &Path, dry_run: bool) -> Result<ThumbReport> {
        let thumb_db = self
            .thumb_db
            .as_mut()
            .ok_or(Error::MissingSetting("library.thumbnail_db"))?;

        let pairs = thumb_db.list_file_paths()?;
        let examined = pairs.len();

        let stale: Vec<(i64, String)> = pairs
            .into_iter()
            .filter(|(_, path)| !Path::new(path).starts_with(prefix))
            .collect();
        for (id, path) in &stale {
            debug!(thumbnail = id, %path, "thumbnail outside collection prefix");
        }

        let deleted = if dry_run {
            info!(stale = stale.len(), "dry run — leaving stale thumbnails in place");
            0
        } else {
            let ids: Vec<i64> = stale.iter().map(|(id, _)| *id).collect();
            thumb_db.delete_thumbnails(&ids)?
        };

        info!(examined, stale = stale.len(), deleted, "thumbnail cleanup finished");
        Ok(ThumbReport {
            examined,
            stale,
            deleted,
        })
    }

    /// Detect burst sequences by timestamp proximity and tag every member.
    /// Tag links commit in one transaction at the end.
    pub fn tag_bursts(&mut self, opts: &BurstOptions) -> Result<BurstReport> {
        let rows = self.album_db.images_by_mtime()?;
        let times: Vec<_> = rows.iter().map(|&(_, t)| t).collect();
        let flags = bursts::flag_bursts(&times, Duration::seconds(opts.threshold_secs));
        let flagged: Vec<i64> = rows
            .iter()
            .zip(&flags)
            .filter(|&(_, &is_burst)| is_burst)
            .map(|(&(id, _), _)| id)
            .collect();

        info!(
            examined = rows.len(),
            flagged = flagged.len(),
            threshold_secs = opts.threshold_secs,
            "burst detection finished"
        );

        if opts.dry_run {
            return Ok(BurstReport {
                examined: rows.len(),
                flagged,
                tagged: 0,
            });
        }

        let tag = match self.album_db.tag_by_name(&opts.tag)? {
            Some(tag) => tag,
            None if opts.create_tag => self.album_db.create_tag(None, &opts.tag)?,
            None => return Err(Error::TagNotFound(opts.tag.clone())),
        };
        let tagged = self.album_db.attach_tag_batch(tag.id, &flagged)?;

        info!(tag = %tag.name, tagged, "burst tagging finished");
        Ok(BurstReport {
            examined: rows.len(),
            flagged,
            tagged,
        })
    }

    /// Everything known about one image, path chain resolved.
    pub fn inspect(&self, image_id: i64) -> Result<ImageDetails> {
        let image = self
            .album_db
            .image_by_id(image_id)?
            .ok_or(Error::ImageNotFound(image_id))?;

        let albums = self.album_db.albums_by_id()?;
        let roots = self.album_db.roots_by_id()?;
        let album = image.album_id.and_then(|id| albums.get(&id)).cloned();
        let root = album
            .as_ref()
            .and_then(|a| a.root_id)
            .and_then(|id| roots.get(&id))
            .cloned();

        let path = match (&root, &album) {
            (Some(root), Some(album)) => Some(paths::image_path(root, album, &image)?),
            _ => None,
        };

        Ok(ImageDetails {
            information: self.album_db.information_for(image_id)?,
            metadata: self.album_db.metadata_for(image_id)?,
            video_metadata: self.album_db.video_metadata_for(image_id)?,
            tags: self.album_db.tags_for_image(image_id)?,
            image,
            album,
            root,
            path,
        })
    }

    // ── Tag operations ───────────────────────────────────────────────

    /// All tags with parent names and per-tag image counts.
    pub fn tags_overview(&self) -> Result<Vec<TagOverview>> {
        let tags = self.album_db.list_tags()?;
        let by_id: HashMap<i64, String> =
            tags.iter().map(|t| (t.id, t.name.clone())).collect();
        let counts = self.album_db.tag_image_counts()?;

        Ok(tags
            .into_iter()
            .map(|tag| TagOverview {
                parent_name: tag.parent_id.and_then(|pid| by_id.get(&pid).cloned()),
                image_count: counts.get(&tag.id).copied().unwrap_or(0),
                tag,
            })
            .collect())
    }

    /// Create a tag, optionally under a named parent.
    pub fn create_tag(&self, name: &str, parent: Option<&str>) -> Result<Tag> {
        let parent_id = match parent {
            Some(parent_name) => Some(
                self.album_db
                    .tag_by_name(parent_name)?
                    .ok_or_else(|| Error::TagNotFound(parent_name.to_string()))?
                    .id,
            ),
            None => None,
        };
        self.album_db.create_tag(parent_id, name)
    }

    /// Attach an existing tag to the given images, idempotently.
    /// Returns the number of links newly created.
    pub fn apply_tag(&mut self, name: &str, image_ids: &[i64]) -> Result<usize> {
        let tag = self
            .album_db
            .tag_by_name(name)?
            .ok_or_else(|| Error::TagNotFound(name.to_string()))?;

        for &id in image_ids {
            if self.album_db.image_by_id(id)?.is_none() {
                return Err(Error::ImageNotFound(id));
            }
        }
        self.album_db.attach_tag_batch(tag.id, image_ids)
    }
}
