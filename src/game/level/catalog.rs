//! Ordered list of the levels to play.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::game::LEVEL_EXTENSION;
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<LevelSource>,
}

impl LevelCatalog {
    /// A catalog holding only the built-in level.
    pub fn builtin() -> Self {
        Self { levels: vec![LevelSource::Builtin] }
    }

    /// Collects the visible `.lvl` files of `dir`, sorted by file name.
    pub fn scan(dir: &Path) -> Result<Self, LoadError> {
        let io_error = |source: std::io::Error| LoadError::Io { path: dir.to_path_buf(), source };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let hidden = path
                .file_name()
                .is_none_or(|name| name.to_string_lossy().starts_with('.'));
            let is_level = path.extension().is_some_and(|ext| ext == LEVEL_EXTENSION);
            if !hidden && is_level && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        info!("[Level] {} level(s) found in {}", files.len(), dir.display());
        Ok(Self { levels: files.into_iter().map(LevelSource::File).collect() })
    }

    pub fn levels(&self) -> &[LevelSource] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_sorts_and_filters() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.lvl", "a.lvl", ".hidden.lvl", "notes.txt", "hero.p"] {
            fs::write(dir.path().join(name), "DIM 1 1\n").expect("write fixture");
        }
        fs::create_dir(dir.path().join("c.lvl")).expect("create dir");

        let catalog = LevelCatalog::scan(dir.path()).expect("scan should succeed");
        assert_eq!(
            catalog.levels(),
            &[
                LevelSource::File(dir.path().join("a.lvl")),
                LevelSource::File(dir.path().join("b.lvl")),
            ]
        );
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(LevelCatalog::scan(&dir.path().join("nope")), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.levels()[0], LevelSource::Builtin);
    }
}
