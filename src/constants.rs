//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Width of the separator printed above each now-playing banner
pub const HORIZ_LINE_WIDTH: usize = 78;

/// Extensions scanned when none are given on the command line or in config
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Seconds jumped by a bare `skip`
pub const DEFAULT_SKIP_SECONDS: f64 = 30.0;

/// Added to the remaining track time when computing the input timeout
pub const TIMEOUT_PADDING_SECS: f64 = 0.1;

/// Longest file stem shown in the playback prompt before truncation
pub const PROMPT_NAME_LIMIT: usize = 30;

/// Bookmark file name; hidden according to the host convention
pub const BOOKMARK_FILE_NAME: &str = "tunesift_bookmarks";

/// Separates `<field>::<value>` pairs in an `edit` argument
pub const EDIT_PAIR_SEPARATOR: &str = ",,";

/// Separates field from value inside one `edit` pair
pub const EDIT_FIELD_SEPARATOR: &str = "::";

/// Right-aligned width of field names in `view` output
pub const VIEW_FIELD_WIDTH: usize = 15;

/// Column width used for help listings when the terminal size is unknown
pub const DEFAULT_HELP_WIDTH: usize = 80;

/// Tag field names understood by the tag backend and offered for completion
pub const RECOGNIZED_TAGS: &[&str] = &[
    "album",
    "bpm",
    "compilation",
    "composer",
    "copyright",
    "encodedby",
    "lyricist",
    "length",
    "media",
    "mood",
    "title",
    "version",
    "artist",
    "albumartist",
    "conductor",
    "arranger",
    "discnumber",
    "organization",
    "tracknumber",
    "author",
    "albumartistsort",
    "albumsort",
    "composersort",
    "artistsort",
    "titlesort",
    "isrc",
    "discsubtitle",
    "language",
    "genre",
    "date",
];
