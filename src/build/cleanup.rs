//! Removal of stale outputs before a pack is regenerated.

use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Outcome of a best-effort cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    /// Nothing existed at the path
    NotPresent,
    /// The stale directory tree or file was removed
    Removed,
    /// Removal failed; regeneration continues on top of what is left
    Failed(String),
}

/// Delete a previous output at `path`, directory or file.
///
/// Failures are logged and returned, never propagated.
pub fn clean_destination(path: &Path) -> CleanupStatus {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return CleanupStatus::NotPresent,
    };

    let result =
        if metadata.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) };

    match result {
        Ok(()) => {
            debug!("Removed stale output {}", path.display());
            CleanupStatus::Removed
        }
        Err(e) => {
            warn!("Could not remove stale output {}: {}", path.display(), e);
            CleanupStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(clean_destination(&temp.path().join("none")), CleanupStatus::NotPresent);
    }

    #[test]
    fn test_clean_directory_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Dolphin");
        fs::create_dir_all(dir.join("Anims/Boot")).unwrap();
        fs::write(dir.join("Anims/Boot/frame_0.bm"), b"\x00").unwrap();

        assert_eq!(clean_destination(&dir), CleanupStatus::Removed);
        assert!(!dir.exists());
    }

    #[test]
    fn test_clean_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Dolphin");
        fs::write(&file, b"stale").unwrap();

        let status = clean_destination(&file);
        assert_eq!(status, CleanupStatus::Removed);
        assert!(!file.exists());
    }
}
