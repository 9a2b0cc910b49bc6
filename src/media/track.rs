//! One audio file under management and its tag fields.

use super::tags::{TagBackend, TagMap};
use crate::constants::{EDIT_FIELD_SEPARATOR, EDIT_PAIR_SEPARATOR, VIEW_FIELD_WIDTH};
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// An audio file, its tags and its duration.
///
/// The tag map here is the in-memory state; it only reaches the file through
/// [`Track::save`]. `stored` mirrors what the file holds.
pub struct Track {
    path: PathBuf,
    tags: TagMap,
    stored: TagMap,
    duration: f64,
    backend: Rc<dyn TagBackend>,
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("path", &self.path)
            .field("tags", &self.tags)
            .field("duration", &self.duration)
            .finish()
    }
}

impl Track {
    /// Read the existing tags of `path`.
    pub fn open(path: impl Into<PathBuf>, backend: Rc<dyn TagBackend>) -> Result<Self> {
        let path = path.into();
        let snapshot = backend.read(&path)?;
        Ok(Self {
            path,
            tags: snapshot.fields.clone(),
            stored: snapshot.fields,
            duration: snapshot.duration,
            backend,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the file, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    /// Duration in seconds, as reported when the file was opened.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn first_value(&self, field: &str) -> Option<&str> {
        self.tags
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Merge `fields` into the in-memory tags without touching the file.
    pub fn update(&mut self, fields: &TagMap) {
        for (field, values) in fields {
            self.tags.insert(field.clone(), values.clone());
        }
    }

    /// Merge `fields` and write the ones that differ from the file.
    ///
    /// Fields already merged by [`Track::update`] but never written still count
    /// as changed.
    pub fn save(&mut self, fields: &TagMap) -> Result<()> {
        self.update(fields);
        let changed: TagMap = self
            .tags
            .iter()
            .filter(|(field, values)| self.stored.get(field.as_str()) != Some(*values))
            .map(|(field, values)| (field.clone(), values.clone()))
            .collect();

        if changed.is_empty() {
            log::debug!("nothing to save for {}", self.path.display());
            return Ok(());
        }
        self.backend.write(&self.path, &changed)?;
        self.stored.extend(changed);
        Ok(())
    }

    /// Apply an `edit` argument to the in-memory tags.
    ///
    /// Returns the malformed segments; the valid ones are applied regardless.
    pub fn update_from_str(&mut self, arg: &str) -> Vec<Error> {
        let edits = parse_field_edits(arg);
        self.update(&edits.fields);
        edits.errors
    }

    /// Aligned `field: value` lines for every non-empty field.
    pub fn summary(&self) -> String {
        format_fields(&self.tags)
    }
}

/// The result of parsing an `edit` argument.
#[derive(Debug, Default)]
pub struct FieldEdits {
    pub fields: TagMap,
    pub errors: Vec<Error>,
}

/// Parse `field::value,, field::value` into a field map.
///
/// Pairs are separated by `,,` and split at the first `::`; both sides are
/// trimmed and field names lower-cased. A later pair for the same field
/// replaces an earlier one. Blank segments are ignored.
pub fn parse_field_edits(arg: &str) -> FieldEdits {
    let mut edits = FieldEdits::default();
    for segment in arg.split(EDIT_PAIR_SEPARATOR) {
        if segment.trim().is_empty() {
            continue;
        }
        match segment.split_once(EDIT_FIELD_SEPARATOR) {
            Some((field, value)) if !field.trim().is_empty() => {
                edits
                    .fields
                    .insert(field.trim().to_lowercase(), vec![value.trim().to_string()]);
            }
            _ => edits.errors.push(Error::EditFormat {
                segment: segment.trim().to_string(),
            }),
        }
    }
    edits
}

/// One `view` line: the field name right-aligned, then the value.
pub fn format_field(field: &str, value: &str) -> String {
    format!("{field:>width$}: {value}", width = VIEW_FIELD_WIDTH)
}

/// View lines for every field with a non-empty first value.
pub fn format_fields(fields: &TagMap) -> String {
    fields
        .iter()
        .filter_map(|(field, values)| {
            values
                .first()
                .filter(|value| !value.is_empty())
                .map(|value| format_field(field, value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
