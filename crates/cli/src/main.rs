mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use phototidy_core::config::Config;
use phototidy_core::{BurstOptions, Library};
use tracing_subscriber::EnvFilter;

/// phototidy — maintenance toolkit for a digiKam photo library
#[derive(Parser)]
#[command(name = "phototidy", version, about)]
struct Cli {
    /// Path to the config file (default: the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to digiKam's main database (overrides the config file)
    #[arg(long, global = true)]
    album_db: Option<PathBuf>,

    /// Path to the thumbnail database (overrides the config file)
    #[arg(long, global = true)]
    thumbnail_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show row counts for both databases
    Status,
    /// Remove image records whose album or root can no longer be resolved
    Orphans {
        /// Report what would be deleted without touching the database
        #[arg(long)]
        dry_run: bool,
        /// Also remove images whose file no longer exists on disk
        #[arg(long)]
        verify_files: bool,
    },
    /// Remove cached thumbnails outside the collection prefix
    Thumbs {
        /// Report what would be deleted without touching the database
        #[arg(long)]
        dry_run: bool,
        /// Collection prefix (overrides the config file)
        #[arg(long)]
        prefix: Option<PathBuf>,
    },
    /// Tag photo sequences shot within the burst threshold
    Bursts {
        /// Report flagged images without tagging
        #[arg(long)]
        dry_run: bool,
        /// Maximum gap between consecutive shots, in seconds
        #[arg(long)]
        threshold_secs: Option<i64>,
        /// Tag to apply (overrides the config file)
        #[arg(long)]
        tag: Option<String>,
        /// Create the tag at the top level if it does not exist
        #[arg(long)]
        create_tag: bool,
    },
    /// Show everything known about one image record
    Inspect {
        /// Image id
        id: i64,
    },
    /// List, create, or apply tags
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },
}

#[derive(Subcommand)]
enum TagsAction {
    /// List all tags with parents and image counts
    List,
    /// Create a tag, optionally under a parent tag
    Create {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Attach an existing tag to the given images
    Apply {
        name: String,
        /// Image id (repeatable)
        #[arg(long = "image", required = true)]
        images: Vec<i64>,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("PHOTOTIDY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.album_db {
        config.library.album_db = Some(path);
    }
    if let Some(path) = cli.thumbnail_db {
        config.library.thumbnail_db = Some(path);
    }

    let album_db = config.album_db()?.to_path_buf();
    let thumb_db = config.library.thumbnail_db.clone();
    tracing::debug!(album_db = %album_db.display(), "opening library");
    let mut library = Library::open(&album_db, thumb_db.as_deref())?;

    match cli.command {
        Commands::Status => commands::status::run(&library),
        Commands::Orphans {
            dry_run,
            verify_files,
        } => commands::orphans::run(&mut library, dry_run, verify_files),
        Commands::Thumbs { dry_run, prefix } => {
            let prefix = match prefix {
                Some(prefix) => prefix,
                None => config.collection_prefix()?.to_path_buf(),
            };
            commands::thumbs::run(&mut library, &prefix, dry_run)
        }
        Commands::Bursts {
            dry_run,
            threshold_secs,
            tag,
            create_tag,
        } => {
            let opts = BurstOptions {
                threshold_secs: threshold_secs.unwrap_or(config.bursts.threshold_secs),
                tag: tag.unwrap_or_else(|| config.bursts.tag.clone()),
                create_tag,
                dry_run,
            };
            commands::bursts::run(&mut library, &opts)
        }
        Commands::Inspect { id } => commands::inspect::run(&library, id),
        Commands::Tags { action } => match action {
            TagsAction::List => commands::tags::list(&library),
            TagsAction::Create { name, parent } => {
                commands::tags::create(&library, &name, parent.as_deref())
            }
            TagsAction::Apply { name, images } => {
                commands::tags::apply(&mut library, &name, &images)
            }
        },
    }
}
