//! Playback: the playback shell, the nested metadata shell and the media transport.

pub mod editor;
pub mod session;
pub mod transport;

pub use editor::MetadataEditor;
pub use session::{
    PlaybackOptions, PlaybackSession, PlaybackStatus, SkipTarget, prompt_for, remaining_timeout,
    skip_target,
};
pub use transport::{MediaEngine, Transport, location_for, path_from_location};

#[cfg(feature = "player")]
pub use transport::{RodioEngine, RodioTransport};

use crate::config::Config;
use std::error::Error;

/// Send log output to the configured log file; the terminal is left to the shell.
pub fn init_logging(config: &Config, verbose: bool) -> Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, LevelFilter, WriteLogger};
    use std::fs::File;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    let log_file = config.log_path();
    CombinedLogger::init(vec![WriteLogger::new(
        level,
        simplelog::Config::default(),
        File::create(&log_file)?,
    )])?;

    log::info!("tunesift {} logging to {}", env!("CARGO_PKG_VERSION"), log_file.display());
    Ok(())
}
