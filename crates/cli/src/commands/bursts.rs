use anyhow::Result;
use phototidy_core::{BurstOptions, Library};

pub fn run(library: &mut Library, opts: &BurstOptions) -> Result<()> {
    let report = library.tag_bursts(opts)?;

    if report.flagged.is_empty() {
        println!(
            "No bursts found among {} timed images (threshold {}s).",
            report.examined, opts.threshold_secs
        );
        return Ok(());
    }

    if opts.dry_run {
        println!(
            "{} of {} timed images belong to bursts (threshold {}s, dry run):",
            report.flagged.len(),
            report.examined,
            opts.threshold_secs
        );
        for id in &report.flagged {
            println!("  #{id}");
        }
    } else {
        println!(
            "Tagged {} burst images with '{}' ({} links were already present).",
            report.flagged.len(),
            opts.tag,
            report.flagged.len() - report.tagged
        );
    }
    Ok(())
}
