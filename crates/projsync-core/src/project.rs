use crate::backend::{ListOptions, ProjectBackend};
use crate::error::{ProjectError, Result};
use projsync_paths::FileListing;
use std::fmt;
use std::path::{Path, PathBuf};

/// The project formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// An `.xcodeproj` bundle or the `project.pbxproj` inside one.
    Xcode,
    VcxProj,
    Sln,
}

impl ProjectKind {
    /// Classify `path` by extension, returning the file to load for it.
    pub fn detect(path: &Path) -> Option<(ProjectKind, PathBuf)> {
        let extension = path.extension()?.to_str()?;
        let matches = |expected: &str| extension.eq_ignore_ascii_case(expected);

        if matches("xcodeproj") {
            Some((ProjectKind::Xcode, path.join("project.pbxproj")))
        } else if matches("pbxproj") {
            Some((ProjectKind::Xcode, path.to_path_buf()))
        } else if matches("vcxproj") {
            Some((ProjectKind::VcxProj, path.to_path_buf()))
        } else if matches("sln") {
            Some((ProjectKind::Sln, path.to_path_buf()))
        } else {
            None
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Xcode => f.write_str("Xcode project"),
            ProjectKind::VcxProj => f.write_str("Visual Studio project"),
            ProjectKind::Sln => f.write_str("Visual Studio solution"),
        }
    }
}

/// A project of any supported format.
pub struct Project {
    kind: ProjectKind,
    backend: Box<dyn ProjectBackend>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("kind", &self.kind)
            .field("path", &self.backend.path())
            .finish()
    }
}

impl Project {
    /// Load the project at `path`, choosing the backend from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = strip_trailing_separators(path.as_ref());
        if !path.exists() {
            return Err(ProjectError::NotFound { path });
        }

        let (kind, descriptor) =
            ProjectKind::detect(&path).ok_or_else(|| ProjectError::UnsupportedFormat {
                path: path.clone(),
            })?;
        tracing::debug!("Loading {} as {}", descriptor.display(), kind);

        let backend = load_backend(kind, &descriptor)?;
        Ok(Self { kind, backend })
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        self.backend.path()
    }

    pub fn target_names(&self) -> Result<Vec<String>> {
        self.backend.target_names()
    }

    pub fn list_files(
        &self,
        target: &str,
        base_dir: &Path,
        options: &ListOptions,
    ) -> Result<FileListing> {
        self.backend.list_files(target, base_dir, options)
    }
}

/// Backends compiled out by cargo features report their files as unsupported.
fn load_backend(kind: ProjectKind, descriptor: &Path) -> Result<Box<dyn ProjectBackend>> {
    match kind {
        #[cfg(feature = "xcode")]
        ProjectKind::Xcode => Ok(Box::new(projsync_xcode::XcodeProject::from_path(
            descriptor,
        )?)),
        #[cfg(feature = "vs")]
        ProjectKind::VcxProj => Ok(Box::new(projsync_vs::VcxProject::from_path(descriptor)?)),
        #[cfg(feature = "vs")]
        ProjectKind::Sln => Ok(Box::new(projsync_vs::Solution::from_path(descriptor)?)),
        #[cfg(not(all(feature = "vs", feature = "xcode")))]
        _ => Err(ProjectError::UnsupportedFormat {
            path: descriptor.to_path_buf(),
        }),
    }
}

fn strip_trailing_separators(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    let trimmed = text.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
