//! Path helpers for on-disk state.
//!
//! gigsearch keeps two files in its data directory: the JSON key-value store
//! backing recent searches and favorites, and an optional rotating log.

use std::path::{Path, PathBuf};

/// Name of the directory created under the platform data directory.
pub const APP_DIR_NAME: &str = "gigsearch";

/// File name of the JSON key-value store.
pub const STORE_FILE_NAME: &str = "state.json";

/// Returns the default data directory for gigsearch storage.
///
/// This is the platform data directory with `gigsearch` appended, for example
/// `~/.local/share/gigsearch` on Linux. When the platform reports no data
/// directory the current directory is used instead.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Path of the key-value store file inside `data_dir`.
///
/// # Examples
///
/// ```
/// use gigsearch::infrastructure::store_file;
/// use std::path::Path;
///
/// assert_eq!(store_file(Path::new("/data")), Path::new("/data/state.json"));
/// ```
#[must_use]
pub fn store_file(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE_NAME)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and tildes when no home directory is known, are
/// returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(get_data_dir().ends_with(APP_DIR_NAME));
    }

    #[test]
    fn absolute_paths_are_untouched() {
        assert_eq!(expand_tilde("/var/lib/gigsearch"), PathBuf::from("/var/lib/gigsearch"));
        assert_eq!(expand_tilde("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn tilde_expands_under_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/gigs"), home.join("gigs"));
            assert_eq!(expand_tilde("~"), home);
        }
    }
}
