use std::path::Path;

use anyhow::Result;
use phototidy_core::Library;

pub fn run(library: &mut Library, prefix: &Path, dry_run: bool) -> Result<()> {
    let report = library.clean_thumbnails(prefix, dry_run)?;

    if report.stale.is_empty() {
        println!(
            "All {} thumbnails fall under {}.",
            report.examined,
            prefix.display()
        );
        return Ok(());
    }

    for (id, path) in &report.stale {
        println!("  #{id}: {path}");
    }
    if dry_run {
        println!(
            "{} stale thumbnails of {} examined (dry run, nothing deleted).",
            report.stale.len(),
            report.examined
        );
    } else {
        println!(
            "Deleted {} stale thumbnails of {} examined.",
            report.deleted, report.examined
        );
    }
    Ok(())
}
