use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use phototidy_core::albumdb::AlbumDb;
use phototidy_core::domain::{Album, AlbumRoot, ImageEntry};
use phototidy_core::error::Error;
use phototidy_core::thumbdb::ThumbDb;
use phototidy_core::{BurstOptions, Library, OrphanOptions, OrphanProgress};

fn ts(offset_secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        + Duration::seconds(offset_secs)
}

fn make_root(identifier: &str, specific: &str) -> AlbumRoot {
    AlbumRoot {
        id: 0,
        label: Some("main".to_string()),
        status: 0,
        root_type: 1,
        identifier: Some(identifier.to_string()),
        specific_path: Some(specific.to_string()),
    }
}

fn make_album(root_id: i64, relative: &str) -> Album {
    Album {
        id: 0,
        root_id: Some(root_id),
        relative_path: relative.to_string(),
        date: None,
        caption: None,
        collection: None,
        icon: None,
    }
}

fn make_image(album_id: Option<i64>, name: &str, mtime: Option<NaiveDateTime>) -> ImageEntry {
    ImageEntry {
        id: 0,
        album_id,
        name: name.to_string(),
        status: 1,
        category: 1,
        mtime,
        size: Some(1024),
        unique_hash: None,
    }
}

/// Scratch album database: one healthy root/album plus a root with an
/// identifier that does not decode. Returns (db, healthy album id, bad-root
/// album id).
fn seeded_album_db(mount: &str) -> (AlbumDb, i64, i64) {
    let db = AlbumDb::open_in_memory().unwrap();
    let root = db
        .insert_root(&make_root(&format!("volumeid:?path={mount}"), "/Pictures"))
        .unwrap();
    let album = db.insert_album(&make_album(root, "/2021")).unwrap();

    let bad_root = db
        .insert_root(&make_root("volumeid:?uuid=dead-beef", "/Other"))
        .unwrap();
    let bad_album = db.insert_album(&make_album(bad_root, "/stale")).unwrap();

    (db, album, bad_album)
}

// ── Library::open ────────────────────────────────────────────────

#[test]
fn test_open_missing_album_db_errors() {
    let err = Library::open(Path::new("/nonexistent/digikam4.db"), None).unwrap_err();
    assert!(matches!(err, Error::DatabaseNotFound(_)));
}

#[test]
fn test_open_existing_databases() {
    let tmp = tempfile::tempdir().unwrap();
    let album_path = tmp.path().join("digikam4.db");
    let thumb_path = tmp.path().join("thumbnails-digikam.db");
    {
        let db = AlbumDb::create(&album_path).unwrap();
        let root = db
            .insert_root(&make_root("volumeid:?path=/media/disk", "/Pictures"))
            .unwrap();
        db.insert_album(&make_album(root, "/2021")).unwrap();
        ThumbDb::create(&thumb_path).unwrap();
    }

    let library = Library::open(&album_path, Some(&thumb_path)).unwrap();
    let stats = library.status().unwrap();
    assert_eq!(stats.albums.roots, 1);
    assert_eq!(stats.albums.albums, 1);
    assert_eq!(stats.thumbnails, Some(0));
}

// ── Orphan cleanup ───────────────────────────────────────────────

#[test]
fn test_orphan_cleanup_removes_unresolvable_images() {
    let (db, album, bad_album) = seeded_album_db("/media/disk");
    let healthy = db.insert_image(&make_image(Some(album), "ok.jpg", None)).unwrap();
    let no_album = db.insert_image(&make_image(None, "lost.jpg", None)).unwrap();
    let dangling = db.insert_image(&make_image(Some(999), "dangling.jpg", None)).unwrap();
    let bad_ident = db
        .insert_image(&make_image(Some(bad_album), "bad-root.jpg", None))
        .unwrap();

    // Tag one orphan so the cascade is visible.
    let tag = db.create_tag(None, "holiday").unwrap();
    db.attach_tag(no_album, tag.id).unwrap();

    let mut library = Library::from_parts(db, None);
    let report = library
        .clean_orphans(&OrphanOptions::default(), None)
        .unwrap();

    assert_eq!(report.examined, 4);
    assert_eq!(report.deleted, 3);
    let mut orphaned: Vec<i64> = report.orphans.iter().map(|&(id, _)| id).collect();
    orphaned.sort();
    let mut expected = vec![no_album, dangling, bad_ident];
    expected.sort();
    assert_eq!(orphaned, expected);

    let db = library.album_db();
    assert!(db.image_by_id(healthy).unwrap().is_some());
    assert!(db.image_by_id(no_album).unwrap().is_none());
    assert!(db.image_by_id(dangling).unwrap().is_none());
    assert!(db.image_by_id(bad_ident).unwrap().is_none());
    // The tag survives, the link does not.
    assert!(db.tag_by_name("holiday").unwrap().is_some());
    assert_eq!(db.counts().unwrap().image_tags, 0);
}

#[test]
fn test_orphan_cleanup_dry_run_deletes_nothing() {
    let (db, album, _) = seeded_album_db("/media/disk");
    db.insert_image(&make_image(Some(album), "ok.jpg", None)).unwrap();
    let orphan = db.insert_image(&make_image(None, "lost.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    let opts = OrphanOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = library.clean_orphans(&opts, None).unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(report.orphans.len(), 1);
    assert!(library.album_db().image_by_id(orphan).unwrap().is_some());
}

#[test]
fn test_orphan_cleanup_reports_progress() {
    let (db, album, _) = seeded_album_db("/media/disk");
    db.insert_image(&make_image(Some(album), "a.jpg", None)).unwrap();
    db.insert_image(&make_image(Some(album), "b.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    let mut started_with = 0usize;
    let mut examined = 0usize;
    let mut completed = false;
    library
        .clean_orphans(
            &OrphanOptions::default(),
            Some(&mut |event| match event {
                OrphanProgress::Start { total } => started_with = total,
                OrphanProgress::Examined { .. } => examined += 1,
                OrphanProgress::Complete { .. } => completed = true,
            }),
        )
        .unwrap();

    assert_eq!(started_with, 2);
    assert_eq!(examined, 2);
    assert!(completed);
}

#[test]
fn test_orphan_cleanup_verify_files() {
    let tmp = tempfile::tempdir().unwrap();
    let mount = tmp.path().join("mount");
    fs::create_dir_all(mount.join("Pictures/2021")).unwrap();
    fs::write(mount.join("Pictures/2021/present.jpg"), b"jpeg").unwrap();

    let (db, album, _) = seeded_album_db(&mount.to_string_lossy());
    let present = db
        .insert_image(&make_image(Some(album), "present.jpg", None))
        .unwrap();
    let vanished = db
        .insert_image(&make_image(Some(album), "vanished.jpg", None))
        .unwrap();

    let mut library = Library::from_parts(db, None);
    let opts = OrphanOptions {
        verify_files: true,
        ..Default::default()
    };
    let report = library.clean_orphans(&opts, None).unwrap();

    assert_eq!(report.deleted, 1);
    assert!(library.album_db().image_by_id(present).unwrap().is_some());
    assert!(library.album_db().image_by_id(vanished).unwrap().is_none());
}

#[test]
fn test_orphan_cleanup_verify_files_skips_unmounted_root() {
    // Root directory does not exist at all: resolvable but unmounted.
    let (db, album, _) = seeded_album_db("/nonexistent-mount-point");
    let image = db.insert_image(&make_image(Some(album), "a.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    let opts = OrphanOptions {
        verify_files: true,
        ..Default::default()
    };
    let report = library.clean_orphans(&opts, None).unwrap();

    // Nothing deleted: the unmounted volume is skipped, not treated as loss.
    assert_eq!(report.deleted, 0);
    assert!(library.album_db().image_by_id(image).unwrap().is_some());
}

// ── Thumbnail cleanup ────────────────────────────────────────────

#[test]
fn test_thumbnail_cleanup_removes_paths_outside_prefix() {
    let thumbs = ThumbDb::open_in_memory().unwrap();
    thumbs
        .insert_thumbnail("/media/disk/Pictures/2021/a.jpg")
        .unwrap();
    let outside = thumbs.insert_thumbnail("/home/user/stray.jpg").unwrap();
    let album_db = AlbumDb::open_in_memory().unwrap();

    let mut library = Library::from_parts(album_db, Some(thumbs));
    let report = library
        .clean_thumbnails(Path::new("/media/disk/Pictures"), false)
        .unwrap();

    assert_eq!(report.examined, 2);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.stale, vec![(outside, "/home/user/stray.jpg".to_string())]);
    assert_eq!(library.status().unwrap().thumbnails, Some(1));
}

#[test]
fn test_thumbnail_cleanup_prefix_is_component_wise() {
    let thumbs = ThumbDb::open_in_memory().unwrap();
    // Shares the string prefix but not the directory.
    thumbs
        .insert_thumbnail("/media/disk/PicturesBackup/b.jpg")
        .unwrap();
    let album_db = AlbumDb::open_in_memory().unwrap();

    let mut library = Library::from_parts(album_db, Some(thumbs));
    let report = library
        .clean_thumbnails(Path::new("/media/disk/Pictures"), false)
        .unwrap();
    assert_eq!(report.deleted, 1);
}

#[test]
fn test_thumbnail_cleanup_dry_run() {
    let thumbs = ThumbDb::open_in_memory().unwrap();
    thumbs.insert_thumbnail("/elsewhere/a.jpg").unwrap();
    let album_db = AlbumDb::open_in_memory().unwrap();

    let mut library = Library::from_parts(album_db, Some(thumbs));
    let report = library
        .clean_thumbnails(Path::new("/media/disk"), true)
        .unwrap();

    assert_eq!(report.stale.len(), 1);
    assert_eq!(report.deleted, 0);
    assert_eq!(library.status().unwrap().thumbnails, Some(1));
}

#[test]
fn test_thumbnail_cleanup_without_thumb_db_errors() {
    let album_db = AlbumDb::open_in_memory().unwrap();
    let mut library = Library::from_parts(album_db, None);
    let err = library
        .clean_thumbnails(Path::new("/media/disk"), false)
        .unwrap_err();
    assert!(matches!(err, Error::MissingSetting("library.thumbnail_db")));
}

// ── Burst tagging ────────────────────────────────────────────────

fn burst_opts(tag: &str) -> BurstOptions {
    BurstOptions {
        threshold_secs: 2,
        tag: tag.to_string(),
        create_tag: true,
        dry_run: false,
    }
}

#[test]
fn test_burst_tagging_flags_close_pairs() {
    let (db, album, _) = seeded_album_db("/media/disk");
    let a = db.insert_image(&make_image(Some(album), "a.jpg", Some(ts(0)))).unwrap();
    let b = db.insert_image(&make_image(Some(album), "b.jpg", Some(ts(1)))).unwrap();
    let c = db.insert_image(&make_image(Some(album), "c.jpg", Some(ts(10)))).unwrap();
    let d = db.insert_image(&make_image(Some(album), "d.jpg", Some(ts(11)))).unwrap();
    let untimed = db.insert_image(&make_image(Some(album), "e.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    let report = library.tag_bursts(&burst_opts("Burst")).unwrap();

    assert_eq!(report.examined, 4);
    assert_eq!(report.flagged, vec![a, b, c, d]);
    assert_eq!(report.tagged, 4);

    let db = library.album_db();
    for id in [a, b, c, d] {
        let tags = db.tags_for_image(id).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Burst");
    }
    assert!(db.tags_for_image(untimed).unwrap().is_empty());
}

#[test]
fn test_burst_tagging_spread_sequence_tags_nothing() {
    let (db, album, _) = seeded_album_db("/media/disk");
    for (i, offset) in [0, 5, 10].into_iter().enumerate() {
        db.insert_image(&make_image(Some(album), &format!("{i}.jpg"), Some(ts(offset))))
            .unwrap();
    }

    let mut library = Library::from_parts(db, None);
    let report = library.tag_bursts(&burst_opts("Burst")).unwrap();

    assert_eq!(report.examined, 3);
    assert!(report.flagged.is_empty());
    assert_eq!(report.tagged, 0);
}

#[test]
fn test_burst_tagging_is_idempotent() {
    let (db, album, _) = seeded_album_db("/media/disk");
    db.insert_image(&make_image(Some(album), "a.jpg", Some(ts(0)))).unwrap();
    db.insert_image(&make_image(Some(album), "b.jpg", Some(ts(1)))).unwrap();

    let mut library = Library::from_parts(db, None);
    let first = library.tag_bursts(&burst_opts("Burst")).unwrap();
    assert_eq!(first.tagged, 2);

    let second = library.tag_bursts(&burst_opts("Burst")).unwrap();
    assert_eq!(second.flagged.len(), 2);
    assert_eq!(second.tagged, 0);
}

#[test]
fn test_burst_tagging_missing_tag_errors() {
    let (db, album, _) = seeded_album_db("/media/disk");
    db.insert_image(&make_image(Some(album), "a.jpg", Some(ts(0)))).unwrap();
    db.insert_image(&make_image(Some(album), "b.jpg", Some(ts(1)))).unwrap();

    let mut library = Library::from_parts(db, None);
    let mut opts = burst_opts("Burst");
    opts.create_tag = false;
    let err = library.tag_bursts(&opts).unwrap_err();
    assert!(matches!(err, Error::TagNotFound(_)));
}

#[test]
fn test_burst_tagging_dry_run() {
    let (db, album, _) = seeded_album_db("/media/disk");
    db.insert_image(&make_image(Some(album), "a.jpg", Some(ts(0)))).unwrap();
    db.insert_image(&make_image(Some(album), "b.jpg", Some(ts(1)))).unwrap();

    let mut library = Library::from_parts(db, None);
    let mut opts = burst_opts("Burst");
    opts.dry_run = true;
    let report = library.tag_bursts(&opts).unwrap();

    assert_eq!(report.flagged.len(), 2);
    assert_eq!(report.tagged, 0);
    // Dry run creates nothing, not even the tag.
    assert!(library.album_db().tag_by_name("Burst").unwrap().is_none());
}

#[test]
fn test_burst_tagging_uses_existing_tag() {
    let (db, album, _) = seeded_album_db("/media/disk");
    let existing = db.create_tag(None, "Burst").unwrap();
    db.insert_image(&make_image(Some(album), "a.jpg", Some(ts(0)))).unwrap();
    db.insert_image(&make_image(Some(album), "b.jpg", Some(ts(1)))).unwrap();

    let mut library = Library::from_parts(db, None);
    library.tag_bursts(&burst_opts("Burst")).unwrap();

    // No duplicate tag row was created.
    let tags = library.album_db().list_tags().unwrap();
    assert_eq!(tags.iter().filter(|t| t.name == "Burst").count(), 1);
    assert_eq!(tags[0].id, existing.id);
}

// ── Tag operations ───────────────────────────────────────────────

#[test]
fn test_tag_create_apply_and_overview() {
    let (db, album, _) = seeded_album_db("/media/disk");
    let a = db.insert_image(&make_image(Some(album), "a.jpg", None)).unwrap();
    let b = db.insert_image(&make_image(Some(album), "b.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    library.create_tag("Events", None).unwrap();
    library.create_tag("Weddings", Some("Events")).unwrap();

    let attached = library.apply_tag("Weddings", &[a, b]).unwrap();
    assert_eq!(attached, 2);
    // Re-applying is a no-op.
    assert_eq!(library.apply_tag("Weddings", &[a]).unwrap(), 0);

    let overview = library.tags_overview().unwrap();
    assert_eq!(overview.len(), 2);
    let weddings = overview.iter().find(|o| o.tag.name == "Weddings").unwrap();
    assert_eq!(weddings.parent_name.as_deref(), Some("Events"));
    assert_eq!(weddings.image_count, 2);
    let events = overview.iter().find(|o| o.tag.name == "Events").unwrap();
    assert_eq!(events.image_count, 0);
}

#[test]
fn test_apply_tag_unknown_image_errors() {
    let (db, album, _) = seeded_album_db("/media/disk");
    let a = db.insert_image(&make_image(Some(album), "a.jpg", None)).unwrap();

    let mut library = Library::from_parts(db, None);
    library.create_tag("Burst", None).unwrap();
    let err = library.apply_tag("Burst", &[a, 999]).unwrap_err();
    assert!(matches!(err, Error::ImageNotFound(999)));
    // The failed call attached nothing.
    assert!(library.album_db().tags_for_image(a).unwrap().is_empty());
}

#[test]
fn test_create_tag_unknown_parent_errors() {
    let (db, _, _) = seeded_album_db("/media/disk");
    let library = Library::from_parts(db, None);
    let err = library.create_tag("child", Some("nope")).unwrap_err();
    assert!(matches!(err, Error::TagNotFound(_)));
}

// ── Inspect ──────────────────────────────────────────────────────

#[test]
fn test_inspect_resolves_path_chain() {
    let (db, album, _) = seeded_album_db("/media/disk");
    let id = db
        .insert_image(&make_image(Some(album), "IMG_0001.JPG", Some(ts(0))))
        .unwrap();
    let tag = db.create_tag(None, "holiday").unwrap();
    db.attach_tag(id, tag.id).unwrap();

    let library = Library::from_parts(db, None);
    let details = library.inspect(id).unwrap();

    assert_eq!(details.image.name, "IMG_0001.JPG");
    assert_eq!(
        details.path.as_deref(),
        Some(Path::new("/media/disk/Pictures/2021/IMG_0001.JPG"))
    );
    assert_eq!(details.tags.len(), 1);
    assert!(details.information.is_none());
}

#[test]
fn test_inspect_orphan_has_no_path() {
    let (db, _, _) = seeded_album_db("/media/disk");
    let id = db.insert_image(&make_image(None, "lost.jpg", None)).unwrap();

    let library = Library::from_parts(db, None);
    let details = library.inspect(id).unwrap();
    assert!(details.album.is_none());
    assert!(details.path.is_none());
}

#[test]
fn test_inspect_unknown_image_errors() {
    let (db, _, _) = seeded_album_db("/media/disk");
    let library = Library::from_parts(db, None);
    let err = library.inspect(12345).unwrap_err();
    assert!(matches!(err, Error::ImageNotFound(12345)));
}
