//! Template bundle resource lookup.
//!
//! A template bundle is a directory holding optional, conventionally-named
//! artifacts (`page.css`, `header.html`, `cover.pdf`, ...). Every resource is
//! optional per run: consumers check for presence and skip their step when a
//! resource is missing rather than failing.

use std::path::{Path, PathBuf};

/// Resolves named resources relative to one optional base directory.
///
/// With no base directory configured, every lookup misses.
#[derive(Debug, Default)]
pub struct Resources {
    dir: Option<PathBuf>,
}

impl Resources {
    pub fn new(dir: Option<PathBuf>) -> Resources {
        Resources { dir }
    }

    /// Whether the named resource exists in the bundle.
    pub fn has(&self, name: &str) -> bool {
        self.path(name).is_some()
    }

    /// Full path of the named resource, if it exists.
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?;
        let path = dir.join(name);
        path.is_file().then_some(path)
    }

    /// Contents of the named resource, if it exists and is readable.
    ///
    /// Read failures on an existing file are logged and treated as a miss;
    /// a half-configured bundle should degrade, not abort the run.
    pub fn read(&self, name: &str) -> Option<String> {
        let path = self.path(name)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                log::warn!("failed to read resource {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookups_miss_without_a_base_directory() {
        let resources = Resources::default();
        assert!(!resources.has("page.css"));
        assert!(resources.path("page.css").is_none());
        assert!(resources.read("page.css").is_none());
    }

    #[test]
    fn resolves_existing_files_and_skips_missing_ones() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        std::fs::write(dir.path().join("page.css"), "body { margin: 0; }")
            .expect("can write fixture");

        let resources = Resources::new(Some(dir.path().to_path_buf()));
        assert!(resources.has("page.css"));
        assert_eq!(
            resources.read("page.css").as_deref(),
            Some("body { margin: 0; }")
        );
        assert!(!resources.has("cover.pdf"));
        assert!(resources.read("cover.pdf").is_none());
    }
}
