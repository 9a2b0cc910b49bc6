//! Persistent set of resume points.
//!
//! The store is a plain text file holding one path per line. Every mutation
//! reads the file, applies the change and rewrites it whole through a
//! temporary file in the same directory, so the in-memory view always matches
//! what is on disk once a call returns successfully.

use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BookmarkStore {
    path: PathBuf,
    entries: BTreeSet<String>,
}

impl BookmarkStore {
    /// Load the store at `path`, creating an empty file if there is none.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "")?;
            log::info!("created bookmark file {}", path.display());
        }
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add `entry`; returns false if it was already present.
    pub fn add(&mut self, entry: &str) -> Result<bool> {
        self.update(|entries| entries.insert(entry.to_string()))
    }

    /// Remove `entry`; removing an absent entry is not an error.
    pub fn remove(&mut self, entry: &str) -> Result<bool> {
        self.update(|entries| entries.remove(entry))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.update(|entries| {
            entries.clear();
            true
        })?;
        log::info!("cleared bookmarks in {}", self.path.display());
        Ok(())
    }

    /// Read-modify-write against the file; memory is only updated on success.
    fn update(&mut self, change: impl FnOnce(&mut BTreeSet<String>) -> bool) -> Result<bool> {
        let mut entries = if self.path.exists() {
            read_entries(&self.path)?
        } else {
            BTreeSet::new()
        };
        let changed = change(&mut entries);
        if changed {
            write_entries(&self.path, &entries)?;
        }
        self.entries = entries;
        Ok(changed)
    }
}

fn read_entries(path: &Path) -> Result<BTreeSet<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn write_entries(path: &Path, entries: &BTreeSet<String>) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let temp_path = dir.join(format!(
        ".tunesift-bookmarks-{}-{}.tmp",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));

    let mut contents = String::new();
    for entry in entries {
        contents.push_str(entry);
        contents.push('\n');
    }

    if let Err(e) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}
