use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;
use tunesift::bookmarks::BookmarkStore;
use tunesift::utils::paths::relative_to;

pub fn handle_clear(store: &mut BookmarkStore) -> Result<(), Box<dyn Error>> {
    store.clear()?;
    println!("\n{} Cleared bookmarks!", "✓".green().bold());
    Ok(())
}

/// List the bookmarks playback will resume from.
pub fn print_existing(store: &BookmarkStore) -> Result<(), Box<dyn Error>> {
    if store.is_empty() {
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    for entry in store.entries() {
        let path = Path::new(entry);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.to_string());
        println!();
        println!("Existing bookmark found: {}", name.cyan());
        println!(
            "  {} {}",
            "RelativePath:".bright_black(),
            relative_to(path, &cwd).display()
        );
    }
    println!();
    println!(
        "Run again with the {} flag to clear bookmarks",
        "-c".yellow()
    );
    println!();
    Ok(())
}
