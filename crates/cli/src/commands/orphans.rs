use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use phototidy_core::{Library, OrphanOptions, OrphanProgress};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  {bar:30.cyan/blue} {pos:>6}/{len:<6} {prefix:.dim}")
        .unwrap()
        .progress_chars("━╸─")
}

pub fn run(library: &mut Library, dry_run: bool, verify_files: bool) -> Result<()> {
    let opts = OrphanOptions {
        dry_run,
        verify_files,
    };

    let mut pb: Option<ProgressBar> = None;
    let report = library.clean_orphans(
        &opts,
        Some(&mut |event| match event {
            OrphanProgress::Start { total } => {
                let bar = ProgressBar::new(total as u64);
                bar.set_style(bar_style());
                bar.set_prefix("Checking");
                pb = Some(bar);
            }
            OrphanProgress::Examined { .. } => {
                if let Some(ref bar) = pb {
                    bar.inc(1);
                }
            }
            OrphanProgress::Complete { .. } => {
                if let Some(bar) = pb.take() {
                    bar.finish_and_clear();
                }
            }
        }),
    )?;

    if report.orphans.is_empty() {
        println!("No orphaned images ({} examined).", report.examined);
        return Ok(());
    }

    for (id, reason) in &report.orphans {
        println!("  #{id}: {reason}");
    }
    if dry_run {
        println!(
            "{} orphaned images of {} examined (dry run, nothing deleted).",
            report.orphans.len(),
            report.examined
        );
    } else {
        println!(
            "Deleted {} orphaned images of {} examined.",
            report.deleted, report.examined
        );
    }
    Ok(())
}
