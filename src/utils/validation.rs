//! Checks run on command-line paths before playback starts.

use owo_colors::OwoColorize;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Validate that every path exists before anything is played.
///
/// # Returns
///
/// * `Ok(())` if all paths exist
/// * `Err` naming the first missing path
pub fn validate_paths_exist(paths: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    for path in paths {
        validate_path_exists(path)?;
    }
    Ok(())
}

/// Validate that a path exists and return an error if it doesn't.
pub fn validate_path_exists(path: &Path) -> Result<(), Box<dyn Error>> {
    if !path.exists() {
        return Err(format!(
            "{} Path does not exist: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    Ok(())
}

/// Validate a move destination: it may not exist yet, but must not be a file.
pub fn validate_move_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.is_file() {
        return Err(format!(
            "{} Move destination is a file: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_existing_dir_passes() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_path_exists(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_missing_path_is_named() {
        let path = Path::new("/no/such/music/folder");
        let err = validate_path_exists(path).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(err.to_string().contains("/no/such/music/folder"));
    }

    #[test]
    fn test_validate_paths_exist_stops_at_missing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.mp3");
        fs::write(&file_path, "test").unwrap();

        assert!(validate_paths_exist(&[file_path.clone()]).is_ok());
        let missing = temp_dir.path().join("b.mp3");
        let err = validate_paths_exist(&[file_path, missing]).unwrap_err();
        assert!(err.to_string().contains("b.mp3"));
    }

    #[test]
    fn test_validate_move_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_move_dir(&temp_dir.path().join("new")).is_ok());

        let file_path = temp_dir.path().join("file");
        fs::write(&file_path, "x").unwrap();
        assert!(validate_move_dir(&file_path).is_err());
    }
}
