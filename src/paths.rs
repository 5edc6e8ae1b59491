//! Rendering of paths written into trainer-facing files.
//!
//! The trainer is launched from its own directory, so every path it reads
//! must be either absolute or relative to that directory (the "exec base").

use std::path::{Component, Path, PathBuf};

use crate::error::ExportError;

/// How paths are written into output files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathStyle {
    Absolute,
    /// Relative to this directory. If it names an existing file, its parent
    /// directory is used instead.
    RelativeTo(PathBuf),
}

impl PathStyle {
    pub fn render(&self, path: &Path) -> Result<String, ExportError> {
        let rendered = match self {
            PathStyle::Absolute => absolute(path)?,
            PathStyle::RelativeTo(base) => {
                let base = if base.is_file() {
                    base.parent().unwrap_or(Path::new("."))
                } else {
                    base.as_path()
                };
                relative_path(&absolute(base)?, &absolute(path)?)
            }
        };
        Ok(rendered.to_string_lossy().into_owned())
    }
}

/// Absolute, lexically normalized form of `path`. Symlinks are not resolved
/// and `..` never climbs above the root.
pub fn absolute(path: &Path) -> Result<PathBuf, ExportError> {
    let joined = std::path::absolute(path).map_err(|source| ExportError::io(path, source))?;
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Path that leads from directory `from` to `to`. Both must be absolute and
/// normalized.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_climbs_out_of_the_base() {
        let rel = relative_path(Path::new("/work/darknet"), Path::new("/work/config/train.txt"));
        assert_eq!(rel, PathBuf::from("../config/train.txt"));
    }

    #[test]
    fn relative_path_into_subdirectory() {
        let rel = relative_path(Path::new("/work"), Path::new("/work/data/a.jpg"));
        assert_eq!(rel, PathBuf::from("data/a.jpg"));
    }

    #[test]
    fn relative_path_to_itself_is_dot() {
        assert_eq!(
            relative_path(Path::new("/work"), Path::new("/work")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn normalize_drops_dot_segments() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn render_relative_uses_parent_of_file_base() {
        let temp = tempfile::tempdir().unwrap();
        let exe = temp.path().join("darknet");
        std::fs::write(&exe, b"").unwrap();

        let style = PathStyle::RelativeTo(exe);
        let rendered = style.render(&temp.path().join("cfg/obj.data")).unwrap();
        assert_eq!(PathBuf::from(rendered), PathBuf::from("cfg/obj.data"));
    }

    #[test]
    fn render_absolute_is_absolute() {
        let rendered = PathStyle::Absolute.render(Path::new("some/file.txt")).unwrap();
        assert!(Path::new(&rendered).is_absolute());
    }
}
