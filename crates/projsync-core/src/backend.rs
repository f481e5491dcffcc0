//! The interface shared by every supported project format.

use crate::Result;
use projsync_config::ProjsyncConfig;
use projsync_paths::FileListing;
use std::path::Path;

/// Knobs that change how a backend resolves a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Project hops followed when an Xcode target lives in a referenced project.
    pub max_delegation_depth: usize,
    /// Require a Visual Studio project's file stem to equal the requested target.
    pub strict_target_names: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            max_delegation_depth: projsync_config::DEFAULT_MAX_DELEGATION_DEPTH,
            strict_target_names: false,
        }
    }
}

impl From<&ProjsyncConfig> for ListOptions {
    fn from(config: &ProjsyncConfig) -> Self {
        Self {
            max_delegation_depth: config.max_delegation_depth,
            strict_target_names: config.strict_target_names,
        }
    }
}

/// A loaded project that can enumerate its targets and list their files.
pub trait ProjectBackend {
    /// The descriptor file the project was loaded from.
    fn path(&self) -> &Path;

    /// Names accepted by [`ProjectBackend::list_files`], in declaration order.
    fn target_names(&self) -> Result<Vec<String>>;

    /// Build source files and other referenced files of `target`, with paths
    /// relative to `base_dir`.
    fn list_files(&self, target: &str, base_dir: &Path, options: &ListOptions)
    -> Result<FileListing>;
}

#[cfg(feature = "xcode")]
impl ProjectBackend for projsync_xcode::XcodeProject {
    fn path(&self) -> &Path {
        projsync_xcode::XcodeProject::path(self)
    }

    fn target_names(&self) -> Result<Vec<String>> {
        Ok(projsync_xcode::XcodeProject::target_names(self)?)
    }

    fn list_files(
        &self,
        target: &str,
        base_dir: &Path,
        options: &ListOptions,
    ) -> Result<FileListing> {
        Ok(self.list_files_with_depth(target, base_dir, options.max_delegation_depth)?)
    }
}

#[cfg(feature = "vs")]
impl ProjectBackend for projsync_vs::VcxProject {
    fn path(&self) -> &Path {
        &self.path
    }

    fn target_names(&self) -> Result<Vec<String>> {
        Ok(vec![self.name.clone()])
    }

    fn list_files(
        &self,
        target: &str,
        base_dir: &Path,
        options: &ListOptions,
    ) -> Result<FileListing> {
        if options.strict_target_names {
            self.ensure_target(target)?;
        }
        Ok(projsync_vs::VcxProject::list_files(self, target, base_dir)?)
    }
}

#[cfg(feature = "vs")]
impl ProjectBackend for projsync_vs::Solution {
    fn path(&self) -> &Path {
        &self.path
    }

    fn target_names(&self) -> Result<Vec<String>> {
        Ok(projsync_vs::Solution::target_names(self))
    }

    fn list_files(
        &self,
        target: &str,
        base_dir: &Path,
        options: &ListOptions,
    ) -> Result<FileListing> {
        if !options.strict_target_names {
            return Ok(projsync_vs::Solution::list_files(self, target, base_dir)?);
        }

        let entry = self
            .find_project(target)
            .ok_or_else(|| crate::ProjectError::TargetNotFound {
                name: target.to_string(),
                path: self.path.clone(),
            })?;
        let project = projsync_vs::VcxProject::from_path(&entry.absolute_path)?;
        ProjectBackend::list_files(&project, target, base_dir, options)
    }
}
