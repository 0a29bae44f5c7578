use anyhow::Result;
use chrono::NaiveDateTime;
use phototidy_core::{ImageDetails, Library};

pub fn run(library: &Library, id: i64) -> Result<()> {
    let details = library.inspect(id)?;
    print_details(&details);
    Ok(())
}

fn print_details(details: &ImageDetails) {
    let image = &details.image;
    println!("Image #{} — {}", image.id, image.name);
    println!("{}", "-".repeat(60));

    match (&details.album, &details.root) {
        (Some(album), Some(root)) => {
            let label = root.label.as_deref().unwrap_or("unlabeled");
            println!("  Album:    {} (root {})", album.relative_path, label);
        }
        (Some(album), None) => println!("  Album:    {} (root missing)", album.relative_path),
        _ => println!("  Album:    missing"),
    }
    match &details.path {
        Some(path) => println!("  Path:     {}", path.display()),
        None => println!("  Path:     unresolvable"),
    }
    println!("  Modified: {}", format_mtime(image.mtime));
    if let Some(size) = image.size {
        println!("  Size:     {size} bytes");
    }
    if let Some(hash) = &image.unique_hash {
        println!("  Hash:     {hash}");
    }

    if let Some(info) = &details.information {
        if let (Some(width), Some(height)) = (info.width, info.height) {
            println!("  Pixels:   {width}x{height}");
        }
        if let Some(rating) = info.rating {
            println!("  Rating:   {rating}");
        }
        if let Some(format) = &info.format {
            println!("  Format:   {format}");
        }
    }
    if let Some(meta) = &details.metadata {
        let camera = [meta.make.as_deref(), meta.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !camera.is_empty() {
            println!("  Camera:   {camera}");
        }
    }
    if let Some(video) = &details.video_metadata {
        if let Some(codec) = &video.video_codec {
            println!("  Codec:    {codec}");
        }
        if let Some(duration) = &video.duration {
            println!("  Duration: {duration}s");
        }
    }

    if details.tags.is_empty() {
        println!("  Tags:     none");
    } else {
        let names: Vec<&str> = details.tags.iter().map(|t| t.name.as_str()).collect();
        println!("  Tags:     {}", names.join(", "));
    }
}

fn format_mtime(mtime: Option<NaiveDateTime>) -> String {
    match mtime {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}
