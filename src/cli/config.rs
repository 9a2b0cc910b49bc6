use owo_colors::OwoColorize;
use std::error::Error;
use tunesift::config::Config;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current tunesift configuration:");
    println!("  extensions: {}", config.extensions.join(","));
    println!("  recursive: {}", config.recursive);
    println!("  interactive: {}", config.interactive);
    println!(
        "  move_dir: {}",
        config.move_dir.as_deref().unwrap_or("(not set)")
    );
    println!("  skip_seconds: {}", config.skip_seconds);
    println!("  show_aliases: {}", config.show_aliases);
    println!("  log_level: {}", config.log_level);
    println!("  log_file: {}", config.log_path().display());
    println!("  bookmark_file: {}", config.bookmark_path()?.display());
    println!();
    println!(
        "{} {}",
        "Config file:".bright_black(),
        Config::config_path()?.display()
    );

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}
