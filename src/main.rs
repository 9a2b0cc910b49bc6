//! tunesift - audition a folder of audio files from the terminal.
//!
//! Files are played one after another while a small command shell stays
//! open: skip around in the track, delete it, bookmark it as the place to
//! resume next time, copy it somewhere else, or fix its tags in a nested
//! metadata shell. A track that finishes moves on to the next by itself.

use clap::{CommandFactory, Parser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tunesift::bookmarks::BookmarkStore;
use tunesift::config::Config;
use tunesift::media::split_extensions;

mod cli;

#[derive(Parser)]
#[command(name = "tunesift")]
#[command(about = "Play through audio files and skip, delete, bookmark or retag them as they play")]
#[command(version)]
struct Cli {
    /// Files or directories to play
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,
    /// Comma separated extension(s) to look for in directories
    #[arg(short, long, value_name = "EXT,EXT")]
    extension: Option<String>,
    /// Ask for confirmation before deleting files
    #[arg(short, long)]
    interact: bool,
    /// Search directories recursively
    #[arg(short, long)]
    recursive: bool,
    /// Clear bookmarks and exit
    #[arg(short, long)]
    clear: bool,
    /// Destination root for the `move` command
    #[arg(short, long, value_name = "DIR")]
    move_to: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
    /// Show the current configuration and exit
    #[arg(long)]
    show_config: bool,
    /// Set a configuration value and exit
    #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
    set: Option<Vec<String>>,
}

impl Cli {
    /// Configuration for this run: the config file with flags applied on top.
    fn effective_config(&self) -> Result<Config, Box<dyn Error>> {
        let mut config = Config::load()?;
        if let Some(list) = &self.extension {
            let extensions = split_extensions(list);
            if extensions.is_empty() {
                return Err("--extension needs at least one extension".into());
            }
            config.extensions = extensions;
        }
        config.interactive |= self.interact;
        config.recursive |= self.recursive;
        if let Some(dir) = &self.move_to {
            config.move_dir = Some(dir.display().to_string());
        }
        Ok(config)
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        print_completions(shell, &mut cmd);
        return Ok(());
    }
    if cli.show_config {
        return cli::config::handle_config_view();
    }
    if let Some([key, value]) = cli.set.as_deref() {
        return cli::config::handle_config_set(key, value);
    }

    let config = cli.effective_config()?;
    if cli.clear {
        let mut store = BookmarkStore::open(config.bookmark_path()?)?;
        return cli::bookmarks::handle_clear(&mut store);
    }

    cli::play::handle_play(&cli.paths, &config, cli.verbose)
}
