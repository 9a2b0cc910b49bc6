#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;
use tunesift::bookmarks::BookmarkStore;
use tunesift::media::{FileSequence, MemoryBackend, tag_map};
use tunesift::player::{
    MediaEngine, PlaybackOptions, PlaybackSession, Transport, location_for,
};
use tunesift::shell::{Console, ReadOutcome, ScriptedReader};
use tunesift::{Error, Result};

pub const TRACK_SECONDS: f64 = 120.0;

/// Everything the fake player was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Opened(PathBuf),
    Played(PathBuf),
    Stopped(PathBuf),
    Seeked(PathBuf, f64),
    Released,
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub struct FakeTransport {
    path: PathBuf,
    location: String,
    events: EventLog,
    /// Number of `is_playing` checks answered with true before the track ends
    plays_for: Cell<usize>,
    stopped: bool,
    position: f64,
    fails_to_play: bool,
}

impl Transport for FakeTransport {
    fn play(&mut self) -> Result<()> {
        if self.fails_to_play {
            return Err(Error::Audio(format!("no output for {}", self.path.display())));
        }
        self.events
            .borrow_mut()
            .push(Event::Played(self.path.clone()));
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.events
            .borrow_mut()
            .push(Event::Stopped(self.path.clone()));
    }

    fn is_playing(&self) -> bool {
        if self.stopped {
            return false;
        }
        let left = self.plays_for.get();
        if left == 0 {
            return false;
        }
        self.plays_for.set(left - 1);
        true
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn set_position(&mut self, position: f64) -> Result<()> {
        self.position = position;
        self.events
            .borrow_mut()
            .push(Event::Seeked(self.path.clone(), position));
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Media engine that plays nothing and records what it was asked to do.
pub struct FakeEngine {
    pub events: EventLog,
    /// `is_playing` checks each opened track stays playing for
    pub plays_for: usize,
    /// Position every opened track starts at
    pub start_position: f64,
    pub unplayable: HashSet<PathBuf>,
    /// Open fine but fail once asked to play
    pub unstartable: HashSet<PathBuf>,
}

impl FakeEngine {
    pub fn new(plays_for: usize) -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
            plays_for,
            start_position: 0.0,
            unplayable: HashSet::new(),
            unstartable: HashSet::new(),
        }
    }
}

impl MediaEngine for FakeEngine {
    fn open(&mut self, path: &Path) -> Result<Box<dyn Transport>> {
        if self.unplayable.contains(path) {
            return Err(Error::Audio(format!("cannot decode {}", path.display())));
        }
        self.events
            .borrow_mut()
            .push(Event::Opened(path.to_path_buf()));
        Ok(Box::new(FakeTransport {
            path: path.to_path_buf(),
            location: location_for(path)?,
            events: Rc::clone(&self.events),
            plays_for: Cell::new(self.plays_for),
            stopped: false,
            position: self.start_position,
            fails_to_play: self.unstartable.contains(path),
        }))
    }

    fn release(&mut self) {
        self.events.borrow_mut().push(Event::Released);
    }
}

#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl io::Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn console(script: Vec<ReadOutcome>) -> (Console, SharedOutput) {
    let output = SharedOutput::default();
    let console = Console::new(
        Box::new(ScriptedReader::new(script)),
        Box::new(output.clone()),
    );
    (console, output)
}

pub fn lines(lines: &[&str]) -> Vec<ReadOutcome> {
    lines
        .iter()
        .map(|line| ReadOutcome::Line(line.to_string()))
        .collect()
}

/// A music directory with tagged (fake) tracks and a bookmark file beside it.
pub struct Library {
    pub temp_dir: TempDir,
    pub tracks: Vec<PathBuf>,
    pub tags: Rc<MemoryBackend>,
}

impl Library {
    /// `names` are created under `<temp>/music/`, in the order given.
    pub fn new(names: &[&str]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let music = temp_dir.path().join("music");
        fs::create_dir_all(&music).unwrap();

        let tags = Rc::new(MemoryBackend::new());
        let mut tracks = Vec::new();
        for (number, name) in names.iter().enumerate() {
            let path = music.join(name);
            fs::write(&path, b"not really audio").unwrap();
            let path = fs::canonicalize(path).unwrap();
            let title = format!("Title {}", number + 1);
            tags.insert(
                path.clone(),
                tag_map([("title", title.as_str()), ("artist", "The Band")]),
                TRACK_SECONDS,
            );
            tracks.push(path);
        }
        Self {
            temp_dir,
            tracks,
            tags,
        }
    }

    pub fn music_dir(&self) -> PathBuf {
        self.temp_dir.path().join("music")
    }

    pub fn bookmark_path(&self) -> PathBuf {
        self.temp_dir.path().join(".bookmarks")
    }

    pub fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::open(self.bookmark_path()).unwrap()
    }

    pub fn files(&self) -> FileSequence {
        Box::new(self.tracks.clone().into_iter())
    }

    pub fn session(&self, engine: FakeEngine, options: PlaybackOptions) -> PlaybackSession {
        PlaybackSession::new(
            self.files(),
            Box::new(engine),
            self.tags.clone(),
            self.bookmarks(),
            options,
        )
    }
}

pub fn opened(events: &EventLog) -> Vec<PathBuf> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Opened(path) => Some(path.clone()),
            _ => None,
        })
        .collect()
}

pub fn seeks(events: &EventLog) -> Vec<f64> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Seeked(_, position) => Some(*position),
            _ => None,
        })
        .collect()
}
