//! The playback shell.
//!
//! A [`PlaybackSession`] works through a [`FileSequence`] one file at a time.
//! Each file is opened on the media engine, announced with a banner and
//! played while the shell waits for a command. The input timeout tracks the
//! time left in the current track, so a track that ends while nobody types
//! still wakes the loop, and the session's `postcmd` hook moves on to the
//! next file whenever the transport has stopped.

use super::editor::MetadataEditor;
use super::transport::{MediaEngine, Transport, path_from_location};
use crate::bookmarks::BookmarkStore;
use crate::constants::{DEFAULT_SKIP_SECONDS, HORIZ_LINE_WIDTH, TIMEOUT_PADDING_SECS};
use crate::error::{Error, Result};
use crate::media::{FileSequence, TagBackend, Track};
use crate::shell::{Console, Dispatcher, EOF_COMMAND, Flow, HelpHeaders, Session};
use crate::utils::paths::{file_stem, truncate_name};
use std::fs;
use std::io::Write;
use std::iter;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

const INITIAL_PROMPT: &str = "> ";

#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Ask before deleting
    pub interactive: bool,
    /// Destination root for `move`
    pub move_dir: Option<PathBuf>,
    /// Seconds jumped by a bare `skip`
    pub skip_seconds: f64,
    /// Offer aliases in tab completion
    pub show_aliases: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            interactive: false,
            move_dir: None,
            skip_seconds: DEFAULT_SKIP_SECONDS,
            show_aliases: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// A track is loaded on the transport
    Playing,
    /// Nothing loaded yet
    NoTrack,
    /// Quit; the session is over
    Stopped,
}

/// Where a `skip` lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipTarget {
    /// Past the end: stop the track
    End,
    /// Before the start: rewind to the beginning
    Start,
    /// Seek to this normalized position
    Seek(f64),
}

/// Normalized skip arithmetic: `position + seconds / duration`.
///
/// Overshooting the end stops, undershooting the start clamps to zero.
/// A track of unknown length can only be stopped or rewound.
pub fn skip_target(position: f64, seconds: f64, duration: f64) -> SkipTarget {
    if !(duration.is_finite() && duration > 0.0) {
        return if seconds > 0.0 {
            SkipTarget::End
        } else {
            SkipTarget::Start
        };
    }
    let target = position + seconds / duration;
    if target > 1.0 {
        SkipTarget::End
    } else if target < 0.0 {
        SkipTarget::Start
    } else {
        SkipTarget::Seek(target)
    }
}

/// Time left in the track plus a little padding.
pub fn remaining_timeout(duration: f64, position: f64) -> Duration {
    let remaining = duration * (1.0 - position);
    let remaining = if remaining.is_finite() { remaining.max(0.0) } else { 0.0 };
    Duration::from_secs_f64(remaining + TIMEOUT_PADDING_SECS)
}

/// `<stem> > `, with long stems shortened.
pub fn prompt_for(path: &Path) -> String {
    format!("{} > ", truncate_name(&file_stem(path)))
}

struct Loaded {
    transport: Box<dyn Transport>,
    editor: MetadataEditor,
}

pub struct PlaybackState {
    files: FileSequence,
    engine: Box<dyn MediaEngine>,
    tags: Rc<dyn TagBackend>,
    bookmarks: BookmarkStore,
    options: PlaybackOptions,
    current: Option<Loaded>,
    status: PlaybackStatus,
    prompt: String,
    timeout: Option<Duration>,
}

impl PlaybackState {
    fn current_track(&self) -> Option<&Track> {
        self.current.as_ref().map(|loaded| loaded.editor.track())
    }

    /// Path of the loaded media, resolved from the transport's location.
    fn current_file(&self) -> Result<PathBuf> {
        let loaded = self.current.as_ref().ok_or(Error::NoTrack)?;
        path_from_location(loaded.transport.location())
    }

    fn open(&mut self, path: &Path) -> Result<Loaded> {
        let track = Track::open(path, Rc::clone(&self.tags))?;
        let transport = self.engine.open(path)?;
        let prompt = prompt_for(path);
        let editor = MetadataEditor::new(track, Some(&prompt));
        self.prompt = prompt;
        Ok(Loaded { transport, editor })
    }

    /// Stop the current file and start the next playable one.
    ///
    /// Files that cannot be opened or started are reported and skipped. When the
    /// sequence runs out the session quits and [`Flow::Stop`] is returned.
    fn next_track(&mut self, console: &mut Console) -> Result<Flow> {
        if let Some(loaded) = self.current.as_mut() {
            loaded.transport.stop();
        }

        loop {
            let Some(path) = self.files.next() else {
                log::info!("file sequence exhausted");
                self.quit();
                return Ok(Flow::Stop);
            };

            let started = self.open(&path).and_then(|mut loaded| {
                loaded.transport.play()?;
                Ok(loaded)
            });
            match started {
                Ok(loaded) => {
                    let track = loaded.editor.track();
                    writeln!(console, "{}", "-".repeat(HORIZ_LINE_WIDTH))?;
                    writeln!(console, "playing: {}", track.file_name())?;
                    writeln!(console, "Title: {}", track.first_value("title").unwrap_or(""))?;
                    writeln!(console, "Artist: {}", track.first_value("artist").unwrap_or(""))?;
                    writeln!(console, "Path: {}", path.display())?;

                    self.timeout = Some(remaining_timeout(track.duration(), 0.0));
                    log::info!("playing {} ({:.1}s)", path.display(), track.duration());

                    self.current = Some(loaded);
                    self.status = PlaybackStatus::Playing;
                    return Ok(Flow::Continue);
                }
                Err(e @ (Error::Io(_) | Error::Tags(_) | Error::Audio(_) | Error::Location(_))) => {
                    log::warn!("skipping {}: {e}", path.display());
                    writeln!(console, "skipping {}: {e}", path.display())?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Release the player and drop whatever is left of the sequence.
    fn quit(&mut self) {
        if let Some(mut loaded) = self.current.take() {
            loaded.transport.stop();
        }
        self.engine.release();
        self.files = Box::new(iter::empty());
        self.status = PlaybackStatus::Stopped;
        self.timeout = None;
    }
}

impl Session for PlaybackState {
    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn preloop(&mut self, console: &mut Console) -> Result<Flow> {
        match self.next_track(console)? {
            Flow::Continue => Ok(Flow::Continue),
            Flow::Stop => Err(Error::EmptyFileList),
        }
    }

    fn postcmd(&mut self, console: &mut Console, flow: Flow) -> Result<Flow> {
        if flow == Flow::Stop || self.status == PlaybackStatus::Stopped {
            return Ok(Flow::Stop);
        }
        let Some(loaded) = self.current.as_ref() else {
            return self.next_track(console);
        };
        if !loaded.transport.is_playing() {
            log::info!("finished {}", loaded.editor.track().path().display());
            return self.next_track(console);
        }
        let duration = loaded.editor.track().duration();
        self.timeout = Some(remaining_timeout(duration, loaded.transport.position()));
        Ok(Flow::Continue)
    }
}

/// The top-level shell: plays a file sequence and takes commands meanwhile.
pub struct PlaybackSession {
    dispatcher: Dispatcher<PlaybackState>,
    state: PlaybackState,
}

impl PlaybackSession {
    pub fn new(
        files: FileSequence,
        engine: Box<dyn MediaEngine>,
        tags: Rc<dyn TagBackend>,
        bookmarks: BookmarkStore,
        options: PlaybackOptions,
    ) -> Self {
        let mut dispatcher =
            Dispatcher::new(HelpHeaders::standard()).with_alias_completion(options.show_aliases);
        dispatcher
            .register("quit", quit, QUIT_DOC)
            .register("next_track", next_track, NEXT_TRACK_DOC)
            .register("edit", edit, EDIT_DOC)
            .register("delete", delete, DELETE_DOC)
            .register("skip", skip, SKIP_DOC)
            .register("bookmark", bookmark, BOOKMARK_DOC)
            .register("remove_bookmark", remove_bookmark, REMOVE_BOOKMARK_DOC)
            .register("move", move_file, MOVE_DOC)
            .register(EOF_COMMAND, quit, "")
            .help_topic("keys", KEYS_TOPIC);
        for (alias, command) in [
            ("h", "help"),
            ("d", "delete"),
            ("e", "edit"),
            ("q", "quit"),
            ("s", "skip"),
            ("b", "bookmark"),
            ("n", "next_track"),
            ("next", "next_track"),
            ("m", "move"),
            ("r", "remove_bookmark"),
            ("remove", "remove_bookmark"),
        ] {
            if let Err(e) = dispatcher.alias(alias, Some(command)) {
                log::warn!("playback alias {alias}: {e}");
            }
        }

        let state = PlaybackState {
            files,
            engine,
            tags,
            bookmarks,
            options,
            current: None,
            status: PlaybackStatus::NoTrack,
            prompt: INITIAL_PROMPT.to_string(),
            timeout: None,
        };
        Self { dispatcher, state }
    }

    /// Play until the sequence is exhausted or the user quits.
    ///
    /// Fails with [`Error::EmptyFileList`] when there is nothing to play.
    pub fn run(&mut self, console: &mut Console) -> Result<()> {
        self.dispatcher.run(&mut self.state, console, None, None)
    }

    /// Load the first track, as the loop does before its first prompt.
    pub fn start(&mut self, console: &mut Console) -> Result<Flow> {
        self.state.preloop(console)
    }

    /// One loop iteration: run `line`, then the automatic advance check.
    pub fn execute(&mut self, console: &mut Console, line: &str) -> Result<Flow> {
        let flow = self.dispatcher.onecmd(&mut self.state, console, line)?;
        self.state.postcmd(console, flow)
    }

    pub fn complete(&self, line: &str) -> Vec<String> {
        self.dispatcher.complete(&self.state, line)
    }

    pub fn complete_names(&self, prefix: &str) -> Vec<String> {
        self.dispatcher.complete_names(prefix)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track()
    }

    pub fn prompt(&self) -> String {
        self.state.prompt()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state.timeout
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.state.bookmarks
    }
}

const KEYS_TOPIC: &str = "
    Quick reference:
      <enter>     keep listening; the next track starts when this one ends
      n           next track
      e           edit tags of the current track
      d           delete the current file
      q           quit
      s <num>     jump that many seconds (+/-); a bare s jumps ahead
      b           bookmark the current track as the place to resume next run
      m           copy the current file to the move destination
    ";

const QUIT_DOC: &str = "
    Stop playback and close the shell.

    Usage:
    quit
    ";

fn quit(state: &mut PlaybackState, _console: &mut Console, _arg: &str) -> Result<Flow> {
    log::info!("quit");
    state.quit();
    Ok(Flow::Stop)
}

const NEXT_TRACK_DOC: &str = "
    Move on to the next track.

    Usage:
    next_track
    ";

fn next_track(state: &mut PlaybackState, console: &mut Console, _arg: &str) -> Result<Flow> {
    state.next_track(console)
}

const EDIT_DOC: &str = "
    Open the metadata shell to view and edit the current track's tags.
    Playback continues meanwhile.

    Usage:
    edit
    ";

fn edit(state: &mut PlaybackState, console: &mut Console, _arg: &str) -> Result<Flow> {
    match state.current.as_mut() {
        Some(loaded) => loaded.editor.run(console)?,
        None => writeln!(console, "{}", Error::NoTrack)?,
    }
    Ok(Flow::Continue)
}

const DELETE_DOC: &str = "
    Delete the file being played, then move on to the next track.
    When started with --interact, asks for confirmation first.

    Usage:
    delete
    ";

fn delete(state: &mut PlaybackState, console: &mut Console, _arg: &str) -> Result<Flow> {
    let Some(loaded) = state.current.as_mut() else {
        writeln!(console, "{}", Error::NoTrack)?;
        return Ok(Flow::Continue);
    };
    loaded.transport.stop();

    let path = match state.current_file() {
        Ok(path) => path,
        Err(e) => {
            writeln!(console, "cannot delete: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    if state.options.interactive && !console.confirm("Really delete? (y/n): ")? {
        log::info!("kept {}", path.display());
        return state.next_track(console);
    }

    match fs::remove_file(&path) {
        Ok(()) => {
            log::info!("deleted {}", path.display());
            writeln!(console, "deleted {}", path.display())?;
            state.next_track(console)
        }
        Err(e) => {
            log::error!("deleting {}: {e}", path.display());
            writeln!(console, "failed to delete {}: {e}", path.display())?;
            Ok(Flow::Continue)
        }
    }
}

const SKIP_DOC: &str = "
    Jump forwards or backwards in the current track.
    A bare skip jumps ahead by the configured amount (30 seconds unless changed).

    Usage:
    skip [seconds]

    Options:
    [seconds] -- seconds (+/-) to jump. Jumping past the end finishes the track.
    ";

fn skip(state: &mut PlaybackState, console: &mut Console, arg: &str) -> Result<Flow> {
    let arg = arg.trim();
    let seconds = if arg.is_empty() {
        state.options.skip_seconds
    } else {
        match arg.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => seconds,
            _ => {
                writeln!(console, "{}", Error::InvalidSkip(arg.to_string()))?;
                return Ok(Flow::Continue);
            }
        }
    };

    let Some(loaded) = state.current.as_mut() else {
        writeln!(console, "{}", Error::NoTrack)?;
        return Ok(Flow::Continue);
    };
    let duration = loaded.editor.track().duration();
    let position = loaded.transport.position();
    let result = match skip_target(position, seconds, duration) {
        SkipTarget::End => {
            log::debug!("skip {seconds}s past the end");
            loaded.transport.stop();
            Ok(())
        }
        SkipTarget::Start => loaded.transport.set_position(0.0),
        SkipTarget::Seek(target) => loaded.transport.set_position(target),
    };
    if let Err(e) = result {
        log::warn!("skip {seconds}s: {e}");
        writeln!(console, "{e}")?;
    }
    Ok(Flow::Continue)
}

/// Explicit argument, or the file being played.
fn bookmark_entry(state: &PlaybackState, arg: &str) -> Result<String> {
    let arg = arg.trim();
    if !arg.is_empty() {
        return Ok(arg.to_string());
    }
    Ok(state.current_file()?.display().to_string())
}

const BOOKMARK_DOC: &str = "
    Bookmark a file as the place to resume on the next run.

    Usage:
    bookmark [file]

    Options:
    [file] -- file to bookmark. Defaults to the file being played.
    ";

fn bookmark(state: &mut PlaybackState, console: &mut Console, arg: &str) -> Result<Flow> {
    let outcome = bookmark_entry(state, arg)
        .and_then(|entry| state.bookmarks.add(&entry).map(|added| (entry, added)));
    match outcome {
        Ok((entry, true)) => {
            log::info!("bookmarked {entry}");
            writeln!(console, "bookmarked {entry}")?;
        }
        Ok((entry, false)) => writeln!(console, "already bookmarked: {entry}")?,
        Err(e) => writeln!(console, "cannot bookmark: {e}")?,
    }
    Ok(Flow::Continue)
}

const REMOVE_BOOKMARK_DOC: &str = "
    Remove a file from the bookmarks.

    Usage:
    remove_bookmark [file]

    Options:
    [file] -- file to remove. Defaults to the file being played.
    ";

fn remove_bookmark(state: &mut PlaybackState, console: &mut Console, arg: &str) -> Result<Flow> {
    let outcome = bookmark_entry(state, arg)
        .and_then(|entry| state.bookmarks.remove(&entry).map(|removed| (entry, removed)));
    match outcome {
        Ok((entry, true)) => {
            log::info!("removed bookmark {entry}");
            writeln!(console, "removed bookmark {entry}")?;
        }
        Ok((entry, false)) => writeln!(console, "not bookmarked: {entry}")?,
        Err(e) => writeln!(console, "cannot remove bookmark: {e}")?,
    }
    Ok(Flow::Continue)
}

/// `<dest>/<name of the source's parent dir>/<file name>`
fn move_destination(dest_root: &Path, source: &Path) -> Option<PathBuf> {
    let file_name = source.file_name()?;
    let parent_name = source
        .parent()
        .and_then(Path::file_name)
        .unwrap_or_default();
    Some(dest_root.join(parent_name).join(file_name))
}

const MOVE_DOC: &str = "
    Copy the current file into the move destination, under a folder named
    after the file's own folder. Does nothing without --move-to.

    Usage:
    move
    ";

fn move_file(state: &mut PlaybackState, console: &mut Console, _arg: &str) -> Result<Flow> {
    let Some(dest_root) = state.options.move_dir.clone() else {
        writeln!(console, "no move destination set (see --move-to)")?;
        return Ok(Flow::Continue);
    };

    let copied = state.current_file().and_then(|source| {
        let target = move_destination(&dest_root, &source)
            .ok_or_else(|| Error::Location(source.display().to_string()))?;
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::copy(&source, &target)?;
        log::info!("copied {} to {}", source.display(), target.display());
        Ok(target)
    });
    match copied {
        Ok(target) => writeln!(console, "copied to {}", target.display())?,
        Err(e) => {
            log::error!("move failed: {e}");
            writeln!(console, "cannot move: {e}")?;
        }
    }
    Ok(Flow::Continue)
}
