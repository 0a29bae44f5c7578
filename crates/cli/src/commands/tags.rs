use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use phototidy_core::Library;

pub fn list(library: &Library) -> Result<()> {
    let overview = library.tags_overview()?;

    if overview.is_empty() {
        println!("No tags in the library.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Parent"),
        Cell::new("Images"),
    ]);

    for entry in &overview {
        table.add_row(vec![
            Cell::new(entry.tag.id),
            Cell::new(&entry.tag.name),
            Cell::new(entry.parent_name.as_deref().unwrap_or("\u{2014}")),
            Cell::new(entry.image_count),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn create(library: &Library, name: &str, parent: Option<&str>) -> Result<()> {
    let tag = library.create_tag(name, parent)?;
    match parent {
        Some(parent) => println!("Created tag '{}' under '{}' (id {}).", tag.name, parent, tag.id),
        None => println!("Created tag '{}' (id {}).", tag.name, tag.id),
    }
    Ok(())
}

pub fn apply(library: &mut Library, name: &str, images: &[i64]) -> Result<()> {
    let attached = library.apply_tag(name, images)?;
    println!(
        "Attached '{}' to {} images ({} links were already present).",
        name,
        images.len(),
        images.len() - attached
    );
    Ok(())
}
