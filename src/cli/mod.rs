pub mod bookmarks;
pub mod config;
pub mod play;
