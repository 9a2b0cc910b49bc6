pub mod bookmarks;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod player;
pub mod shell;
pub mod utils;

pub use error::{Error, Result};
