//! Discovery of annotation and image files.
//!
//! Datasets are laid out as nested directories whose names start with a data
//! prefix (`!` by default). Only those directories are descended into, so
//! work-in-progress or excluded folders can sit next to the data without
//! being picked up.
//!
//! Traversal is breadth-first and starts at the search root itself: files
//! directly inside the root are yielded, and the root does not need to
//! carry the prefix.
//!
//! Symlinked directories are followed, but every directory is scanned at
//! most once, keyed by its canonical path. A link back up the tree is
//! therefore harmless.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ExportError;

/// Finds files with a given extension under prefixed data directories.
#[derive(Clone, Debug)]
pub struct PathFinder {
    root: PathBuf,
    prefix: String,
    extension: String,
}

impl PathFinder {
    /// An empty `prefix` descends into every directory.
    pub fn new(
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Lazily yields every matching file.
    pub fn find_all(&self) -> FindAll {
        self.find_with_extension(&self.extension)
    }

    /// Same directories, different file extension.
    pub fn find_with_extension(&self, extension: &str) -> FindAll {
        FindAll {
            pending: VecDeque::from([self.root.clone()]),
            visited: HashSet::new(),
            current: None,
            prefix: self.prefix.clone(),
            suffix: format!(".{extension}"),
        }
    }

    /// Collects [`PathFinder::find_all`], stopping at the first IO error.
    pub fn find_all_list(&self) -> Result<Vec<PathBuf>, ExportError> {
        self.find_all().collect()
    }

    pub fn find_list_with_extension(&self, extension: &str) -> Result<Vec<PathBuf>, ExportError> {
        self.find_with_extension(extension).collect()
    }
}

/// Iterator returned by [`PathFinder::find_all`].
#[derive(Debug)]
pub struct FindAll {
    pending: VecDeque<PathBuf>,
    visited: HashSet<PathBuf>,
    current: Option<(PathBuf, fs::ReadDir)>,
    prefix: String,
    suffix: String,
}

impl FindAll {
    fn is_data_dir(&self, path: &Path, name: &str) -> bool {
        name.starts_with(&self.prefix) && path.is_dir()
    }

    fn is_data_file(&self, path: &Path, name: &str) -> bool {
        name.ends_with(&self.suffix) && path.is_file()
    }
}

impl Iterator for FindAll {
    type Item = Result<PathBuf, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let dir = self.pending.pop_front()?;
                let canonical = match fs::canonicalize(&dir) {
                    Ok(canonical) => canonical,
                    Err(source) => return Some(Err(ExportError::io(dir, source))),
                };
                if !self.visited.insert(canonical) {
                    debug!("Already scanned {}, skipping", dir.display());
                    continue;
                }
                debug!("Scanning {}", dir.display());
                match fs::read_dir(&dir) {
                    Ok(entries) => self.current = Some((dir, entries)),
                    Err(source) => return Some(Err(ExportError::io(dir, source))),
                }
            }

            let (dir, entries) = self.current.as_mut()?;
            let entry = match entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(source)) => return Some(Err(ExportError::io(dir.clone(), source))),
                None => {
                    self.current = None;
                    continue;
                }
            };

            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if self.is_data_file(&path, &name) {
                return Some(Ok(path));
            }
            if self.is_data_dir(&path, &name) {
                self.pending.push_back(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    fn found(finder: &PathFinder, root: &Path) -> BTreeSet<String> {
        finder
            .find_all_list()
            .unwrap()
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn descends_only_into_prefixed_directories() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("top.json"));
        touch(&root.join("!a/one.json"));
        touch(&root.join("!a/!b/two.json"));
        touch(&root.join("!a/skip/three.json"));
        touch(&root.join("other/four.json"));
        touch(&root.join("!a/image.jpg"));

        let finder = PathFinder::new(root, "!", "json");
        let expected: BTreeSet<String> = ["top.json", "!a/one.json", "!a/!b/two.json"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(found(&finder, root), expected);
    }

    #[test]
    fn empty_prefix_descends_everywhere() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("x/one.jpg"));
        touch(&root.join("x/y/two.jpg"));

        let finder = PathFinder::new(root, "", "json");
        let images: BTreeSet<_> = finder
            .find_list_with_extension("jpg")
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn extension_must_follow_a_dot() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("notjson"));
        touch(&root.join("real.json"));

        let finder = PathFinder::new(root, "", "json");
        assert_eq!(finder.find_all_list().unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn directory_cycles_are_scanned_once() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("!a/one.json"));
        touch(&root.join("!a/!b/two.json"));
        std::os::unix::fs::symlink(root.join("!a"), root.join("!a/!loop")).unwrap();
        std::os::unix::fs::symlink(root.join("!a"), root.join("!a/!b/!up")).unwrap();

        let finder = PathFinder::new(root, "!", "json");
        let paths = finder.find_all_list().unwrap();
        assert_eq!(paths.len(), 2, "{paths:?}");

        let canonical: BTreeSet<PathBuf> = paths
            .iter()
            .map(|p| fs::canonicalize(p).unwrap())
            .collect();
        assert_eq!(canonical.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_data_directory_is_followed() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("elsewhere/one.json"));
        std::os::unix::fs::symlink(root.join("elsewhere"), root.join("!linked")).unwrap();

        let finder = PathFinder::new(root, "!", "json");
        let expected: BTreeSet<String> = ["!linked/one.json"].into_iter().map(String::from).collect();
        assert_eq!(found(&finder, root), expected);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let finder = PathFinder::new(temp.path().join("missing"), "!", "json");
        let err = finder.find_all_list().unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
