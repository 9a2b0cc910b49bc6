//! Building the sequence of files a playback session works through.

use crate::error::{Error, Result};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::iter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily produced, one-way sequence of files to play.
pub type FileSequence = Box<dyn Iterator<Item = PathBuf>>;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extensions without the leading dot; matched case-insensitively
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl ScanOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Split a comma separated extension list, dropping blanks and spaces.
pub fn split_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.replace(' ', ""))
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Files under `root` whose extension matches, in file-name order.
pub fn scan_dir(root: &Path, options: &ScanOptions) -> impl Iterator<Item = PathBuf> + use<> {
    let options = options.clone();
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| options.matches(entry.path()))
        .map(|entry| fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.into_path()))
}

/// One sequence over every path given: files are taken as they are,
/// directories are scanned.
///
/// A scanned directory starts at its first file listed in `resume` (see
/// [`ResumeFrom`]). Every path must exist; this is checked before anything
/// is produced.
pub fn file_sequence(
    paths: &[PathBuf],
    options: &ScanOptions,
    resume: &[PathBuf],
) -> Result<FileSequence> {
    let mut parts: Vec<FileSequence> = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_dir() {
            log::info!(
                "scanning {}{}",
                path.display(),
                if options.recursive { " (recursive)" } else { "" }
            );
            parts.push(Box::new(ResumeFrom::new(
                scan_dir(path, options),
                resume.iter().cloned(),
            )));
        } else if path.exists() {
            parts.push(Box::new(iter::once(fs::canonicalize(path)?)));
        } else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("path not found: {}", path.display()),
            )));
        }
    }
    Ok(Box::new(parts.into_iter().flatten()))
}

/// Skips ahead to the first bookmarked file.
///
/// Files before the first bookmark are held back; if the sequence ends
/// without reaching a bookmark they are produced after all, so a stale
/// bookmark never hides the whole sequence.
pub struct ResumeFrom<I> {
    inner: I,
    marks: HashSet<PathBuf>,
    held: VecDeque<PathBuf>,
    searching: bool,
}

impl<I: Iterator<Item = PathBuf>> ResumeFrom<I> {
    pub fn new(inner: I, marks: impl IntoIterator<Item = PathBuf>) -> Self {
        let marks: HashSet<PathBuf> = marks.into_iter().collect();
        Self {
            inner,
            searching: !marks.is_empty(),
            marks,
            held: VecDeque::new(),
        }
    }
}

impl<I: Iterator<Item = PathBuf>> Iterator for ResumeFrom<I> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if self.searching {
            self.searching = false;
            for path in self.inner.by_ref() {
                if self.marks.contains(&path) {
                    log::info!(
                        "resuming at {} ({} files skipped)",
                        path.display(),
                        self.held.len()
                    );
                    self.held.clear();
                    return Some(path);
                }
                self.held.push_back(path);
            }
            log::info!("no bookmarked file in sequence, playing from the start");
        }
        self.held.pop_front().or_else(|| self.inner.next())
    }
}
