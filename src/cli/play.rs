use std::error::Error;
use std::path::PathBuf;
use tunesift::config::Config;

pub fn handle_play(paths: &[PathBuf], config: &Config, verbose: bool) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        run(paths, config, verbose)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = paths;
        let _ = config;
        let _ = verbose;
        use owo_colors::OwoColorize;
        println!("{} {}", "🎵".cyan(), "Playback".bold());
        println!();
        println!(
            "{} Playing audio requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install tunesift --features player".cyan());
        println!();
        println!("Or if building from source:");
        println!("  {}", "cargo build --release --features player".cyan());

        Ok(())
    }
}

#[cfg(feature = "player")]
fn run(paths: &[PathBuf], config: &Config, verbose: bool) -> Result<(), Box<dyn Error>> {
    use owo_colors::OwoColorize;
    use std::rc::Rc;
    use tunesift::bookmarks::BookmarkStore;
    use tunesift::media::{LoftyBackend, ScanOptions, file_sequence};
    use tunesift::player::{PlaybackOptions, PlaybackSession, RodioEngine, init_logging};
    use tunesift::shell::Console;
    use tunesift::utils::validation::{validate_move_dir, validate_paths_exist};

    validate_paths_exist(paths)?;
    let move_dir = config.move_path();
    if let Some(dir) = &move_dir {
        validate_move_dir(dir)?;
    }
    init_logging(config, verbose)?;

    let bookmarks = BookmarkStore::open(config.bookmark_path()?)?;
    super::bookmarks::print_existing(&bookmarks)?;

    let scan = ScanOptions {
        extensions: config.extensions.clone(),
        recursive: config.recursive,
    };
    for path in paths.iter().filter(|path| path.is_dir()) {
        println!(
            "now searching in: {} {}",
            path.display().to_string().cyan(),
            if scan.recursive { "(recursive)" } else { "" }
        );
    }
    let resume: Vec<PathBuf> = bookmarks.entries().map(PathBuf::from).collect();
    let files = file_sequence(paths, &scan, &resume)?;

    let options = PlaybackOptions {
        interactive: config.interactive,
        move_dir,
        skip_seconds: config.skip_seconds,
        show_aliases: config.show_aliases,
    };
    let mut session = PlaybackSession::new(
        files,
        Box::new(RodioEngine::new()),
        Rc::new(LoftyBackend),
        bookmarks,
        options,
    );

    let mut console = Console::stdio();
    match session.run(&mut console) {
        Ok(()) => {
            log::info!("session finished");
            Ok(())
        }
        Err(tunesift::Error::EmptyFileList) => {
            log::warn!("nothing to play in {paths:?}");
            println!(
                "{} empty file list: no files matching {} found",
                "Error:".red().bold(),
                scan.extensions.join(",").yellow()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("session failed: {e}");
            Err(e.into())
        }
    }
}
