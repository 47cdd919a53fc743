//! # Paths
//!
//! Where the configuration and the membership file live.

use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";
pub const JOINED_ROOMS_FILE: &str = "joined-rooms.txt";
pub const LOG_FILE: &str = "b0t.log";

/// Returns the membership file path, stored next to the configuration file.
pub fn joined_rooms_path(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(JOINED_ROOMS_FILE),
        _ => PathBuf::from(JOINED_ROOMS_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_rooms_next_to_config() {
        assert_eq!(
            joined_rooms_path(Path::new("/config/config.yaml")),
            PathBuf::from("/config/joined-rooms.txt")
        );
    }

    #[test]
    fn test_joined_rooms_for_bare_file_name() {
        assert_eq!(
            joined_rooms_path(Path::new("config.yaml")),
            PathBuf::from("joined-rooms.txt")
        );
    }
}
