//! Path normalization and the file-listing types shared by every project backend.
//!
//! Project formats store file locations relative to some root (the project
//! directory, a group, an absolute location). Backends turn those into absolute
//! paths and hand them to [`normalize`], which re-expresses them relative to the
//! caller's base directory. Nothing here checks that files exist.

use serde::Serialize;
use std::collections::HashSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while normalizing paths.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot express {path:?} relative to {base:?}")]
    NotRelative { path: PathBuf, base: PathBuf },
    #[error("Failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PathError>;

/// A file referenced by a target, expressed relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    pub path: String,
    /// Enclosing group or filter names, outermost first.
    pub breadcrumb: Vec<String>,
}

impl ResolvedFile {
    pub fn new(path: impl Into<String>, breadcrumb: Vec<String>) -> Self {
        Self {
            path: path.into(),
            breadcrumb,
        }
    }
}

/// The two lists produced for a target: compiled files and everything else it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileListing {
    pub build_files: Vec<ResolvedFile>,
    pub other_files: Vec<ResolvedFile>,
}

impl FileListing {
    /// Build a listing, sorting both lists by path.
    pub fn new(mut build_files: Vec<ResolvedFile>, mut other_files: Vec<ResolvedFile>) -> Self {
        sort_entries(&mut build_files);
        sort_entries(&mut other_files);
        Self {
            build_files,
            other_files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.build_files.is_empty() && self.other_files.is_empty()
    }
}

/// Stable sort by path in byte order.
pub fn sort_entries(entries: &mut [ResolvedFile]) {
    entries.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Drop entries whose path was already seen, keeping the first occurrence.
pub fn dedup_by_path(entries: Vec<ResolvedFile>) -> Vec<ResolvedFile> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.path.clone()))
        .collect()
}

/// Drop entries whose path appears in `excluded`.
pub fn exclude_paths(entries: Vec<ResolvedFile>, excluded: &[ResolvedFile]) -> Vec<ResolvedFile> {
    let excluded: HashSet<&str> = excluded.iter().map(|entry| entry.path.as_str()).collect();
    entries
        .into_iter()
        .filter(|entry| !excluded.contains(entry.path.as_str()))
        .collect()
}

/// Convert a backslash-delimited path as written in Windows project files.
pub fn from_windows(native: &str) -> PathBuf {
    PathBuf::from(native.trim().replace('\\', "/"))
}

/// Join `relative` onto `root`, canonicalize, and express the result relative to `base`.
///
/// `relative` may itself be absolute, in which case `root` is ignored. Relative
/// `root` and `base` values are taken from the current directory. Components
/// are resolved left to right: symbolic links are followed as long as the path
/// exists on disk, so a `..` after a link climbs from the link's target.
pub fn normalize(root: &Path, relative: &Path, base: &Path) -> Result<String> {
    let target = resolve_components(&absolutize(&root.join(relative))?);
    let base = resolve_components(&absolutize(base)?);
    let relative = relative_to(&target, &base)?;
    Ok(relative.to_string_lossy().into_owned())
}

/// Make `path` absolute against the current directory. No components are folded.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = env::current_dir().map_err(PathError::CurrentDir)?;
        Ok(cwd.join(path))
    }
}

/// Remove `.` components and fold `..` into the preceding component.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

/// Express absolute `path` relative to absolute `base`.
pub fn relative_to(path: &Path, base: &Path) -> Result<PathBuf> {
    let not_relative = || PathError::NotRelative {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    };
    if !path.is_absolute() || !base.is_absolute() {
        return Err(not_relative());
    }

    let (path_root, path_rest) = split_root(path);
    let (base_root, base_rest) = split_root(base);
    if path_root != base_root {
        return Err(not_relative());
    }

    let common = path_rest
        .iter()
        .zip(base_rest.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_rest.len() {
        relative.push("..");
    }
    for part in &path_rest[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}

fn split_root(path: &Path) -> (Vec<Component<'_>>, Vec<&OsStr>) {
    let mut root = Vec::new();
    let mut rest = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => root.push(component),
            Component::CurDir => {}
            other => rest.push(other.as_os_str()),
        }
    }
    (root, rest)
}

/// Resolve an absolute path one component at a time, canonicalizing every
/// prefix that exists and folding the rest lexically.
fn resolve_components(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(resolved.components().next_back(), Some(Component::Normal(_))) {
                    resolved.pop();
                }
            }
            Component::Normal(part) => {
                resolved.push(part);
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
        }
    }

    resolved
}
