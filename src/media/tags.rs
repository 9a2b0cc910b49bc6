//! Tag access for audio files.
//!
//! Tags are exchanged as a [`TagMap`]: lower-case field names (`title`,
//! `artist`, `tracknumber`, ...) mapped to their values. [`LoftyBackend`]
//! translates those names to lofty item keys when reading and writing files;
//! [`MemoryBackend`] keeps everything in memory for tests and dry runs.

use crate::constants::RECOGNIZED_TAGS;
use crate::error::{Error, Result};
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemValue, Tag, TagItem};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// Field name to values; most fields hold a single value.
pub type TagMap = BTreeMap<String, Vec<String>>;

/// Everything read from a file in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSnapshot {
    pub fields: TagMap,
    /// Length of the audio in seconds
    pub duration: f64,
}

pub trait TagBackend {
    fn read(&self, path: &Path) -> Result<TagSnapshot>;

    /// Write `fields` to the file, replacing the values of every field named.
    fn write(&self, path: &Path, fields: &TagMap) -> Result<()>;
}

/// The lofty key for a field name, if it is one of the recognized names.
pub fn item_key(field: &str) -> Option<ItemKey> {
    let key = match field {
        "album" => ItemKey::AlbumTitle,
        "bpm" => ItemKey::Bpm,
        "compilation" => ItemKey::FlagCompilation,
        "composer" => ItemKey::Composer,
        "copyright" => ItemKey::CopyrightMessage,
        "encodedby" => ItemKey::EncodedBy,
        "lyricist" => ItemKey::Lyricist,
        "length" => ItemKey::Length,
        "media" => ItemKey::OriginalMediaType,
        "mood" => ItemKey::Mood,
        "title" => ItemKey::TrackTitle,
        "version" => ItemKey::TrackSubtitle,
        "artist" => ItemKey::TrackArtist,
        "albumartist" => ItemKey::AlbumArtist,
        "conductor" => ItemKey::Conductor,
        "arranger" => ItemKey::Arranger,
        "discnumber" => ItemKey::DiscNumber,
        "organization" => ItemKey::Label,
        "tracknumber" => ItemKey::TrackNumber,
        "author" => ItemKey::Writer,
        "albumartistsort" => ItemKey::AlbumArtistSortOrder,
        "albumsort" => ItemKey::AlbumTitleSortOrder,
        "composersort" => ItemKey::ComposerSortOrder,
        "artistsort" => ItemKey::TrackArtistSortOrder,
        "titlesort" => ItemKey::TrackTitleSortOrder,
        "isrc" => ItemKey::Isrc,
        "discsubtitle" => ItemKey::SetSubtitle,
        "language" => ItemKey::Language,
        "genre" => ItemKey::Genre,
        "date" => ItemKey::RecordingDate,
        _ => return None,
    };
    Some(key)
}

/// The field name for a lofty key, if it is one of the recognized keys.
pub fn field_name(key: &ItemKey) -> Option<&'static str> {
    RECOGNIZED_TAGS
        .iter()
        .copied()
        .find(|name| item_key(name).as_ref() == Some(key))
}

/// Reads and writes tags in place using lofty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyBackend;

impl TagBackend for LoftyBackend {
    fn read(&self, path: &Path) -> Result<TagSnapshot> {
        let tagged_file = Probe::open(path)?.read()?;
        let duration = tagged_file.properties().duration().as_secs_f64();

        let mut fields = TagMap::new();
        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            for item in tag.items() {
                let name = match item.key() {
                    ItemKey::Unknown(raw) => raw.to_lowercase(),
                    key => match field_name(key) {
                        Some(name) => name.to_string(),
                        None => continue,
                    },
                };
                if let Some(text) = item.value().text() {
                    fields.entry(name).or_default().push(text.to_string());
                }
            }
        }

        log::debug!(
            "read {} tag fields from {} ({duration:.1}s)",
            fields.len(),
            path.display()
        );
        Ok(TagSnapshot { fields, duration })
    }

    fn write(&self, path: &Path, fields: &TagMap) -> Result<()> {
        let mut tagged_file = Probe::open(path)?.read()?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file.primary_tag_mut().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} cannot hold tags", path.display()),
            ))
        })?;

        for (field, values) in fields {
            // Unrecognized names go through as-is; not every format keeps them
            let key = item_key(field).unwrap_or_else(|| ItemKey::Unknown(field.clone()));
            tag.remove_key(&key);
            for value in values.iter().filter(|value| !value.is_empty()) {
                tag.push(TagItem::new(key.clone(), ItemValue::Text(value.clone())));
            }
        }

        tag.save_to_path(path, WriteOptions::default())?;
        log::info!("saved {} tag fields to {}", fields.len(), path.display());
        Ok(())
    }
}

/// Tag storage held in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: RefCell<HashMap<PathBuf, TagSnapshot>>,
    writes: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, fields: TagMap, duration: f64) {
        self.files
            .borrow_mut()
            .insert(path.into(), TagSnapshot { fields, duration });
    }

    /// Fields currently stored for `path`.
    pub fn fields(&self, path: &Path) -> Option<TagMap> {
        self.files.borrow().get(path).map(|s| s.fields.clone())
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl TagBackend for MemoryBackend {
    fn read(&self, path: &Path) -> Result<TagSnapshot> {
        self.files.borrow().get(path).cloned().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no tags for {}", path.display()),
            ))
        })
    }

    fn write(&self, path: &Path, fields: &TagMap) -> Result<()> {
        let mut files = self.files.borrow_mut();
        let snapshot = files.entry(path.to_path_buf()).or_default();
        for (field, values) in fields {
            snapshot.fields.insert(field.clone(), values.clone());
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Build a [`TagMap`] from single-valued pairs.
pub fn tag_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> TagMap {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), vec![value.to_string()]))
        .collect()
}
