//! Audio files, their tags and the order they are played in.

pub mod scan;
pub mod tags;
pub mod track;

pub use scan::{FileSequence, ResumeFrom, ScanOptions, file_sequence, scan_dir, split_extensions};
pub use tags::{LoftyBackend, MemoryBackend, TagBackend, TagMap, TagSnapshot, tag_map};
pub use track::{FieldEdits, Track, format_field, format_fields, parse_field_edits};
