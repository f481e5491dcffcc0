//! Format-independent access to project file listings
//!
//! [`Project::load`] picks a backend from the path's extension:
//!
//! - Xcode bundles (`.xcodeproj`, `project.pbxproj`) via the `xcode` feature
//! - Visual Studio projects and solutions (`.vcxproj`, `.sln`) via the `vs` feature
//!
//! Every backend implements [`ProjectBackend`] and reports failures as a
//! [`ProjectError`].
//!
//! # Example
//!
//! ```no_run
//! use projsync_core::{ListOptions, Project};
//! use std::path::Path;
//!
//! let project = Project::load("App.xcodeproj").unwrap();
//! let listing = project
//!     .list_files("App", Path::new("."), &ListOptions::default())
//!     .unwrap();
//! for file in &listing.build_files {
//!     println!("{}", file.path);
//! }
//! ```

mod backend;
mod error;
mod project;

pub use backend::{ListOptions, ProjectBackend};
pub use error::{ProjectError, Result};
pub use project::{Project, ProjectKind};
pub use projsync_paths::{FileListing, ResolvedFile};

use std::path::Path;

/// Load `project_path` and list the files of `target` relative to `base_dir`.
pub fn list_files(
    project_path: impl AsRef<Path>,
    target: &str,
    base_dir: &Path,
    options: &ListOptions,
) -> Result<FileListing> {
    Project::load(project_path)?.list_files(target, base_dir, options)
}

/// Load `project_path` and return the names of its targets.
pub fn target_names(project_path: impl AsRef<Path>) -> Result<Vec<String>> {
    Project::load(project_path)?.target_names()
}
