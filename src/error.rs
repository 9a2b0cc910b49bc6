//! Error types shared by the shell, the sessions and the media layer.

use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Tag reading or writing failed
    #[error(transparent)]
    Tags(#[from] lofty::error::LoftyError),

    /// Decoding or audio output failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// The file sequence had nothing to play
    #[error("empty file list")]
    EmptyFileList,

    /// An `edit` segment without a `<field>::<value>` pair
    #[error("malformed field segment '{segment}' (expected <field>::<value>)")]
    EditFormat { segment: String },

    #[error("No such field {0}")]
    UnknownField(String),

    #[error("invalid skip amount '{0}' (expected seconds, e.g. 'skip -15')")]
    InvalidSkip(String),

    #[error("no command named '{0}'")]
    UnknownCommand(String),

    #[error("no track loaded")]
    NoTrack,

    /// A transport location that does not map back to a local file
    #[error("cannot resolve media location '{0}' to a file")]
    Location(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
