//! Application configuration management.
//!
//! Defaults for the scan (extensions, recursion), the session behaviour
//! (confirmation before delete, skip length, move destination) and the log
//! file. Configuration is stored in the user's config directory (typically
//! ~/.config/tunesift/config.toml); a missing file means defaults. Command
//! line flags override these values for a single run.

use crate::constants::{BOOKMARK_FILE_NAME, DEFAULT_EXTENSIONS, DEFAULT_SKIP_SECONDS};
use crate::utils::paths::hidden_file_name;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    /// Ask before deleting files
    #[serde(default)]
    pub interactive: bool,
    /// Destination root for `move`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_dir: Option<String>,
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
    /// Offer aliases in tab completion alongside command names
    #[serde(default)]
    pub show_aliases: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_file: Option<String>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_skip_seconds() -> f64 {
    DEFAULT_SKIP_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_bool(value: &str) -> Result<bool, Box<dyn Error>> {
    Ok(value
        .parse::<bool>()
        .map_err(|_| "Value must be 'true' or 'false'")?)
}

/// Expand a leading `~` in a configured path.
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            extensions: default_extensions(),
            recursive: false,
            interactive: false,
            move_dir: None,
            skip_seconds: default_skip_seconds(),
            show_aliases: false,
            log_level: default_log_level(),
            log_file: None,
            bookmark_file: None,
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("tunesift")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("tunesift")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Return default config instead of error
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    /// Bookmark file: the configured override, or a hidden file in the config directory.
    pub fn bookmark_path(&self) -> Result<PathBuf, Box<dyn Error>> {
        match &self.bookmark_file {
            Some(path) => Ok(expand(path)),
            None => Ok(Self::config_dir()?.join(hidden_file_name(BOOKMARK_FILE_NAME))),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => expand(path),
            None => std::env::temp_dir().join("tunesift.log"),
        }
    }

    pub fn move_path(&self) -> Option<PathBuf> {
        self.move_dir.as_deref().map(expand)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, Box<dyn Error>> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| format!("Unknown log level: {}", self.log_level).into())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "extensions" => {
                let extensions = crate::media::split_extensions(value);
                if extensions.is_empty() {
                    return Err("At least one extension is required".into());
                }
                self.extensions = extensions;
            }
            "recursive" => self.recursive = parse_bool(value)?,
            "interactive" => self.interactive = parse_bool(value)?,
            "show_aliases" => self.show_aliases = parse_bool(value)?,
            "move_dir" => self.move_dir = optional(value),
            "skip_seconds" => {
                let seconds = value
                    .parse::<f64>()
                    .map_err(|_| "Value must be a number of seconds")?;
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err("Value must be a positive number of seconds".into());
                }
                self.skip_seconds = seconds;
            }
            "log_level" => {
                value
                    .parse::<LevelFilter>()
                    .map_err(|_| format!("Unknown log level: {value}"))?;
                self.log_level = value.to_lowercase();
            }
            "log_file" => self.log_file = optional(value),
            "bookmark_file" => self.bookmark_file = optional(value),
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }
}

/// An empty value clears an optional setting.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Use a mutex to ensure tests that modify environment variables don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_config_home<T>(f: impl FnOnce(&TempDir) -> T) -> T {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let result = f(&temp_dir);

        // Clean up - restore original value if it existed
        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
        result
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.extensions, vec!["mp3"]);
        assert!(!config.recursive);
        assert!(!config.interactive);
        assert_eq!(config.skip_seconds, 30.0);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("recursive = true\n").unwrap();
        assert!(config.recursive);
        assert_eq!(config.extensions, default_extensions());
        assert_eq!(config.skip_seconds, DEFAULT_SKIP_SECONDS);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::new();

        config.set_value("extensions", "mp3, flac").unwrap();
        assert_eq!(config.extensions, vec!["mp3", "flac"]);

        config.set_value("interactive", "true").unwrap();
        assert!(config.interactive);

        config.set_value("skip_seconds", "15").unwrap();
        assert_eq!(config.skip_seconds, 15.0);

        config.set_value("move_dir", "~/keep").unwrap();
        assert_eq!(config.move_dir.as_deref(), Some("~/keep"));
        config.set_value("move_dir", "").unwrap();
        assert!(config.move_dir.is_none());

        config.set_value("log_level", "DEBUG").unwrap();
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);

        assert!(config.set_value("recursive", "sometimes").is_err());
        assert!(config.set_value("skip_seconds", "-3").is_err());
        assert!(config.set_value("extensions", " , ").is_err());
        assert!(config.set_value("log_level", "loud").is_err());
        assert!(config.set_value("unknown_key", "value").is_err());
    }

    #[test]
    fn test_expanded_paths() {
        let mut config = Config::new();
        config.move_dir = Some("/srv/keep".to_string());
        assert_eq!(config.move_path(), Some(PathBuf::from("/srv/keep")));

        config.bookmark_file = Some("/tmp/marks".to_string());
        assert_eq!(config.bookmark_path().unwrap(), PathBuf::from("/tmp/marks"));
    }

    #[test]
    fn test_default_bookmark_path_is_in_config_dir() {
        with_config_home(|temp_dir| {
            let path = Config::new().bookmark_path().unwrap();
            assert!(path.starts_with(temp_dir.path().join("tunesift")));
            assert!(
                path.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .ends_with(BOOKMARK_FILE_NAME)
            );
        });
    }

    #[test]
    fn test_config_save_and_load() {
        with_config_home(|temp_dir| {
            let mut config = Config::new();
            config.recursive = true;
            config.move_dir = Some("/srv/keep".to_string());
            config.save().unwrap();

            // Verify the config file was created in the temp directory
            let config_path = Config::config_path().unwrap();
            assert!(config_path.exists());
            assert!(config_path.starts_with(temp_dir.path().join("tunesift")));

            let loaded = Config::load().unwrap();
            assert_eq!(loaded, config);
        });
    }

    #[test]
    fn test_config_exists() {
        with_config_home(|_| {
            assert!(!Config::exists().unwrap());
            Config::new().save().unwrap();
            assert!(Config::exists().unwrap());
        });
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        with_config_home(|_| {
            assert_eq!(Config::load().unwrap(), Config::new());
        });
    }
}
