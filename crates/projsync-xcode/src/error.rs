//! Error types for Xcode project resolution

use crate::object::ObjectId;
use crate::plist::PlistError;
use projsync_paths::PathError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XcodeError {
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Plist {
        path: PathBuf,
        #[source]
        source: PlistError,
    },

    #[error("Invalid object graph in {path:?}: {message}")]
    Graph { path: PathBuf, message: String },

    #[error("Object {0} is referenced but not defined")]
    MissingObject(ObjectId),

    #[error("Object {id} is a {found}, expected a {expected}")]
    UnexpectedObject {
        id: ObjectId,
        expected: &'static str,
        found: String,
    },

    #[error("No such target {name} in {path:?}")]
    TargetNotFound { name: String, path: PathBuf },

    #[error("Ambiguous target {name}: {count} targets share this name")]
    AmbiguousTarget { name: String, count: usize },

    #[error("Unsupported source tree {source_tree} for object {id}")]
    UnsupportedRoot { id: ObjectId, source_tree: String },

    #[error("Target {name} is delegated more than {limit} project hop(s) away")]
    DelegationDepthExceeded { name: String, limit: usize },

    #[error(transparent)]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, XcodeError>;
