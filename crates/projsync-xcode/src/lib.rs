//! Reader for Xcode `.xcodeproj` bundles.
//!
//! A bundle's `project.pbxproj` is an old-style property list holding a flat
//! dictionary of objects that refer to each other by identifier. [`plist`]
//! parses the text, [`ObjectGraph`] types the objects and indexes group
//! membership, and [`XcodeProject`] resolves a target's files from it.

pub mod plist;

mod error;
mod graph;
mod object;
mod project;

pub use error::{Result, XcodeError};
pub use graph::{ObjectGraph, ParentIndex};
pub use object::{
    BuildFile, BuildPhase, BuildPhaseKind, ContainerItemProxy, FileReference, Group, Object,
    ObjectId, ProjectObject, SourceTree, Target,
};
pub use project::{
    DEFAULT_DELEGATION_DEPTH, DESCRIPTOR_FILE, GroupFiles, TargetLocation, UNNAMED_GROUP,
    XcodeProject,
};
