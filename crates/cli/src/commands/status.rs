use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use phototidy_core::Library;

pub fn run(library: &Library) -> Result<()> {
    let stats = library.status()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Table"), Cell::new("Rows")]);

    table.add_row(vec![Cell::new("Album roots"), Cell::new(stats.albums.roots)]);
    table.add_row(vec![Cell::new("Albums"), Cell::new(stats.albums.albums)]);
    table.add_row(vec![Cell::new("Images"), Cell::new(stats.albums.images)]);
    table.add_row(vec![Cell::new("Tags"), Cell::new(stats.albums.tags)]);
    table.add_row(vec![
        Cell::new("Image-tag links"),
        Cell::new(stats.albums.image_tags),
    ]);
    table.add_row(vec![
        Cell::new("Thumbnails"),
        match stats.thumbnails {
            Some(count) => Cell::new(count),
            None => Cell::new("not configured"),
        },
    ]);

    println!("{table}");
    Ok(())
}
