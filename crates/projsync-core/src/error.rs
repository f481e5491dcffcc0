use projsync_paths::PathError;
use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way listing a project's files can fail.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project path {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("Unsupported project format: {path:?}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to load project: {0}")]
    Load(#[source] BoxError),

    #[error("No such target {name} in {path:?}")]
    TargetNotFound { name: String, path: PathBuf },

    #[error("Ambiguous target {name}: {count} targets share this name")]
    AmbiguousTarget { name: String, count: usize },

    #[error("Unsupported source tree {source_tree} for object {object}")]
    UnsupportedRoot { object: String, source_tree: String },

    #[error("Invalid path: {0}")]
    InvalidPath(#[source] PathError),

    #[error("Target {name} is delegated more than {limit} project hop(s) away")]
    DelegationDepthExceeded { name: String, limit: usize },

    #[error("Target {requested} does not match project {project}")]
    TargetMismatch { requested: String, project: String },
}

pub type Result<T> = std::result::Result<T, ProjectError>;

impl From<PathError> for ProjectError {
    fn from(err: PathError) -> Self {
        ProjectError::InvalidPath(err)
    }
}

#[cfg(feature = "xcode")]
impl From<projsync_xcode::XcodeError> for ProjectError {
    fn from(err: projsync_xcode::XcodeError) -> Self {
        use projsync_xcode::XcodeError;

        match err {
            XcodeError::TargetNotFound { name, path } => {
                ProjectError::TargetNotFound { name, path }
            }
            XcodeError::AmbiguousTarget { name, count } => {
                ProjectError::AmbiguousTarget { name, count }
            }
            XcodeError::UnsupportedRoot { id, source_tree } => ProjectError::UnsupportedRoot {
                object: id.to_string(),
                source_tree,
            },
            XcodeError::DelegationDepthExceeded { name, limit } => {
                ProjectError::DelegationDepthExceeded { name, limit }
            }
            XcodeError::Path(err) => ProjectError::InvalidPath(err),
            other => ProjectError::Load(Box::new(other)),
        }
    }
}

#[cfg(feature = "vs")]
impl From<projsync_vs::VisualStudioError> for ProjectError {
    fn from(err: projsync_vs::VisualStudioError) -> Self {
        use projsync_vs::VisualStudioError;

        match err {
            VisualStudioError::TargetNotFound { name, path } => {
                ProjectError::TargetNotFound { name, path }
            }
            VisualStudioError::TargetMismatch { requested, project } => {
                ProjectError::TargetMismatch { requested, project }
            }
            VisualStudioError::Path(err) => ProjectError::InvalidPath(err),
            other => ProjectError::Load(Box::new(other)),
        }
    }
}
