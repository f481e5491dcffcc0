//! File listing for targets of an Xcode project.

use crate::error::{Result, XcodeError};
use crate::graph::ObjectGraph;
use crate::object::{BuildPhaseKind, Group, Object, ObjectId, SourceTree, Target};
use crate::plist;
use projsync_paths::{FileListing, ResolvedFile};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the descriptor file inside an `.xcodeproj` bundle.
pub const DESCRIPTOR_FILE: &str = "project.pbxproj";

/// Breadcrumb entry for groups that have neither a name nor a path.
pub const UNNAMED_GROUP: &str = "<none>";

/// Number of project hops [`XcodeProject::list_files`] follows for delegated targets.
pub const DEFAULT_DELEGATION_DEPTH: usize = 1;

/// A loaded `project.pbxproj` and the directory its `SOURCE_ROOT` paths are relative to.
#[derive(Debug, Clone)]
pub struct XcodeProject {
    path: PathBuf,
    source_root: PathBuf,
    graph: ObjectGraph,
}

/// Where a requested target lives.
#[derive(Debug)]
pub enum TargetLocation {
    Local(ObjectId),
    /// The target is defined by another project referenced from this one.
    Delegated(Box<XcodeProject>),
}

impl XcodeProject {
    /// Load a project from its `.xcodeproj` bundle or the `project.pbxproj` inside it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(DESCRIPTOR_FILE)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&path).map_err(|source| XcodeError::Io {
            path: path.clone(),
            source,
        })?;
        let value = plist::parse(&contents).map_err(|source| XcodeError::Plist {
            path: path.clone(),
            source,
        })?;
        let graph = ObjectGraph::from_plist(&value).map_err(|message| XcodeError::Graph {
            path: path.clone(),
            message,
        })?;

        let bundle_dir = path.parent().unwrap_or(Path::new(""));
        let mut source_root = bundle_dir.parent().unwrap_or(Path::new("")).to_path_buf();
        if let Some(dir) = graph.project()?.project_dir_path.as_deref() {
            if !dir.is_empty() {
                source_root.push(dir);
            }
        }

        tracing::debug!(
            "Loaded {} with {} objects, source root {}",
            path.display(),
            graph.len(),
            source_root.display()
        );

        Ok(Self {
            path,
            source_root,
            graph,
        })
    }

    /// Path of the `project.pbxproj` file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn target_names(&self) -> Result<Vec<String>> {
        self.graph
            .project()?
            .targets
            .iter()
            .map(|id| self.graph.target(id).map(|target| target.name.clone()))
            .collect()
    }

    /// Find a target of this project by exact name.
    pub fn find_target(&self, name: &str) -> Result<Option<ObjectId>> {
        let mut matches = Vec::new();
        for id in &self.graph.project()?.targets {
            if self.graph.target(id)?.name == name {
                matches.push(id);
            }
        }
        match matches.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some((*id).clone())),
            _ => Err(XcodeError::AmbiguousTarget {
                name: name.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Find the organizational group named after a target.
    ///
    /// Only a direct child of the project's main group qualifies. Projects
    /// without a main group fall back to children of any unnamed group. If
    /// there is not exactly one such group, `None` is returned.
    pub fn find_target_group(&self, name: &str) -> Option<&ObjectId> {
        let parents = self.graph.parents();
        let main_group = self
            .graph
            .project()
            .ok()
            .and_then(|project| project.main_group.as_ref());
        let candidates: Vec<&ObjectId> = self
            .graph
            .groups()
            .filter(|(_, group)| group.display_name() == Some(name))
            .filter(|(id, _)| match (main_group, parents.parent(id)) {
                (Some(main), parent) => parent == Some(main),
                (None, None) => true,
                (None, Some(parent)) => self
                    .graph
                    .group(parent)
                    .map(|group| group.display_name().is_none())
                    .unwrap_or(false),
            })
            .map(|(id, _)| id)
            .collect();

        match candidates.as_slice() {
            [id] => Some(*id),
            [] => None,
            _ => {
                tracing::debug!(
                    "{} root-level groups are named {}, listing build files only",
                    candidates.len(),
                    name
                );
                None
            }
        }
    }

    /// File references compiled by `target`, in build phase and listing order.
    pub fn source_files<'a>(
        &'a self,
        target: &'a Target,
    ) -> impl Iterator<Item = Result<ObjectId>> + 'a {
        target
            .build_phases
            .iter()
            .map(move |id| self.graph.build_phase(id))
            .filter(|phase| match phase {
                Ok(phase) => phase.kind == BuildPhaseKind::Sources,
                Err(_) => true,
            })
            .flat_map(move |phase| -> Box<dyn Iterator<Item = Result<ObjectId>> + 'a> {
                match phase {
                    Ok(phase) => Box::new(
                        phase
                            .files
                            .iter()
                            .filter_map(move |id| self.build_file_reference(id).transpose()),
                    ),
                    Err(err) => Box::new(std::iter::once(Err(err))),
                }
            })
    }

    /// Every non-group descendant of `group`, depth first.
    pub fn group_files<'a>(&'a self, group: &'a Group) -> GroupFiles<'a> {
        GroupFiles {
            graph: &self.graph,
            stack: vec![group.children.iter()],
        }
    }

    /// Absolute (or source-root relative, if the project was loaded from a
    /// relative path) location of a file reference.
    pub fn file_path(&self, id: &ObjectId) -> Result<PathBuf> {
        let file = self.graph.file_reference(id)?;
        let own = file.path.as_deref().unwrap_or("");
        match &file.source_tree {
            SourceTree::Absolute => Ok(PathBuf::from(own)),
            SourceTree::SourceRoot => Ok(self.source_root.join(own)),
            SourceTree::Group => Ok(self.group_location(id)?.join(own)),
            SourceTree::Other(root) => Err(XcodeError::UnsupportedRoot {
                id: id.clone(),
                source_tree: root.clone(),
            }),
        }
    }

    /// Location of a file reference relative to `base_dir`.
    pub fn resolve_path(&self, id: &ObjectId, base_dir: &Path) -> Result<String> {
        let path = self.file_path(id)?;
        Ok(projsync_paths::normalize(&self.source_root, &path, base_dir)?)
    }

    /// Names of the groups enclosing `id`, outermost first, stopping below
    /// `boundary` or below the group at the top of the hierarchy.
    pub fn breadcrumb(&self, id: &ObjectId, boundary: &ObjectId) -> Vec<String> {
        let parents = self.graph.parents();
        let mut names = Vec::new();
        for group_id in parents.ancestors(id) {
            if group_id == boundary || parents.parent(group_id).is_none() {
                break;
            }
            let name = self
                .graph
                .group(group_id)
                .ok()
                .and_then(Group::display_name)
                .unwrap_or(UNNAMED_GROUP);
            names.push(name.to_string());
        }
        names.reverse();
        names
    }

    /// Load the project that defines `name`, if a container proxy in this
    /// project refers to it.
    pub fn find_referenced_target(&self, name: &str) -> Result<Option<XcodeProject>> {
        for (proxy_id, proxy) in self.graph.container_proxies() {
            if proxy.remote_info.as_deref() != Some(name) {
                continue;
            }
            if &proxy.container_portal == self.graph.root_id() {
                continue;
            }
            let container = match self.graph.get(&proxy.container_portal) {
                Ok(Object::FileReference(_)) => match self.file_path(&proxy.container_portal) {
                    Ok(container) => container,
                    Err(err) => {
                        tracing::debug!("Ignoring proxy {}: {}", proxy_id, err);
                        continue;
                    }
                },
                Ok(other) => {
                    tracing::debug!(
                        "Ignoring proxy {} whose container is a {}",
                        proxy_id,
                        other.kind()
                    );
                    continue;
                }
                Err(err) => {
                    tracing::debug!("Ignoring proxy {}: {}", proxy_id, err);
                    continue;
                }
            };
            let descriptor = container.join(DESCRIPTOR_FILE);
            if projsync_paths::lexical_normalize(&descriptor)
                == projsync_paths::lexical_normalize(&self.path)
            {
                continue;
            }
            tracing::debug!(
                "Target {} is provided by {} through proxy {}",
                name,
                descriptor.display(),
                proxy_id
            );
            return XcodeProject::from_path(&descriptor).map(Some);
        }
        Ok(None)
    }

    /// Decide whether `name` is defined here or in a referenced project.
    pub fn locate_target(&self, name: &str) -> Result<TargetLocation> {
        if let Some(id) = self.find_target(name)? {
            return Ok(TargetLocation::Local(id));
        }
        match self.find_referenced_target(name)? {
            Some(project) => Ok(TargetLocation::Delegated(Box::new(project))),
            None => Err(XcodeError::TargetNotFound {
                name: name.to_string(),
                path: self.path.clone(),
            }),
        }
    }

    /// List build source files and other files of the group named after the target.
    pub fn list_files(&self, name: &str, base_dir: &Path) -> Result<FileListing> {
        self.list_files_with_depth(name, base_dir, DEFAULT_DELEGATION_DEPTH)
    }

    /// Like [`XcodeProject::list_files`], following at most `max_depth` delegations.
    pub fn list_files_with_depth(
        &self,
        name: &str,
        base_dir: &Path,
        max_depth: usize,
    ) -> Result<FileListing> {
        let mut delegate: Option<Box<XcodeProject>> = None;
        let mut depth = 0;

        loop {
            let project = delegate.as_deref().unwrap_or(self);
            match project.locate_target(name)? {
                TargetLocation::Local(target) => {
                    return project.list_target_files(&target, name, base_dir);
                }
                TargetLocation::Delegated(next) => {
                    if depth >= max_depth {
                        return Err(XcodeError::DelegationDepthExceeded {
                            name: name.to_string(),
                            limit: max_depth,
                        });
                    }
                    depth += 1;
                    delegate = Some(next);
                }
            }
        }
    }

    fn list_target_files(
        &self,
        target_id: &ObjectId,
        name: &str,
        base_dir: &Path,
    ) -> Result<FileListing> {
        let target = self.graph.target(target_id)?;
        let group = self.find_target_group(name);

        let mut build_ids = HashSet::new();
        let mut build_files = Vec::new();
        for id in self.source_files(target) {
            let id = id?;
            build_files.push(self.resolve_entry(&id, group, base_dir)?);
            build_ids.insert(id);
        }

        let mut other_files = Vec::new();
        if let Some(group_id) = group {
            for id in self.group_files(self.graph.group(group_id)?) {
                let id = id?;
                if build_ids.contains(&id) {
                    continue;
                }
                other_files.push(self.resolve_entry(&id, group, base_dir)?);
            }
        }

        Ok(FileListing::new(build_files, other_files))
    }

    fn resolve_entry(
        &self,
        id: &ObjectId,
        group: Option<&ObjectId>,
        base_dir: &Path,
    ) -> Result<ResolvedFile> {
        let path = self.resolve_path(id, base_dir)?;
        let breadcrumb = match group {
            Some(boundary) => self.breadcrumb(id, boundary),
            None => Vec::new(),
        };
        Ok(ResolvedFile::new(path, breadcrumb))
    }

    fn build_file_reference(&self, id: &ObjectId) -> Result<Option<ObjectId>> {
        let Some(file_ref) = &self.graph.build_file(id)?.file_ref else {
            return Ok(None);
        };
        self.graph.file_reference(file_ref)?;
        Ok(Some(file_ref.clone()))
    }

    /// Directory a `<group>` element is relative to: the path segments of its
    /// enclosing groups, anchored at the first group rooted elsewhere or at the
    /// source root.
    fn group_location(&self, id: &ObjectId) -> Result<PathBuf> {
        let mut anchor = self.source_root.clone();
        let mut segments = Vec::new();

        for group_id in self.graph.parents().ancestors(id) {
            let group = self.graph.group(group_id)?;
            let path = group.path.as_deref().filter(|path| !path.is_empty());
            match &group.source_tree {
                SourceTree::Group => segments.extend(path),
                SourceTree::SourceRoot => {
                    segments.extend(path);
                    break;
                }
                SourceTree::Absolute => {
                    if let Some(path) = path {
                        anchor = PathBuf::from(path);
                        break;
                    }
                }
                SourceTree::Other(root) => {
                    return Err(XcodeError::UnsupportedRoot {
                        id: group_id.clone(),
                        source_tree: root.clone(),
                    });
                }
            }
        }

        for segment in segments.iter().rev() {
            anchor.push(segment);
        }
        Ok(anchor)
    }
}

/// Depth-first walk over the members of a group, see [`XcodeProject::group_files`].
pub struct GroupFiles<'a> {
    graph: &'a ObjectGraph,
    stack: Vec<std::slice::Iter<'a, ObjectId>>,
}

impl<'a> Iterator for GroupFiles<'a> {
    type Item = Result<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let children = self.stack.last_mut()?;
            let Some(id) = children.next() else {
                self.stack.pop();
                continue;
            };
            match self.graph.get(id) {
                Ok(Object::Group(group)) => self.stack.push(group.children.iter()),
                Ok(_) => return Some(Ok(id.clone())),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_project(dir: &Path, bundle: &str, objects: &str) -> PathBuf {
        let bundle_dir = dir.join(bundle);
        fs::create_dir_all(&bundle_dir).unwrap();
        let path = bundle_dir.join(DESCRIPTOR_FILE);
        fs::write(
            &path,
            format!(
                "// !$*UTF8*$!\n{{\n\tarchiveVersion = 1;\n\tclasses = {{\n\t}};\n\tobjectVersion = 56;\n\tobjects = {{\n{objects}\n\t}};\n\trootObject = ROOT /* Project object */;\n}}\n"
            ),
        )
        .unwrap();
        path
    }

    const APP_OBJECTS: &str = r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; projectDirPath = ""; targets = (T_APP /* App */, ); };
		MAIN = {isa = PBXGroup; children = (G_APP, G_SHARED, ); sourceTree = "<group>"; };
		G_APP = {isa = PBXGroup; children = (F_MAIN, F_HEADER, G_UI, ); path = App; sourceTree = "<group>"; };
		G_UI = {isa = PBXGroup; children = (F_VIEW, F_XIB, ); name = UI; path = Views; sourceTree = "<group>"; };
		G_SHARED = {isa = PBXGroup; children = (F_UTIL, ); name = Shared; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.m; sourceTree = "<group>"; };
		F_HEADER = {isa = PBXFileReference; path = App.h; sourceTree = "<group>"; };
		F_VIEW = {isa = PBXFileReference; path = View.m; sourceTree = "<group>"; };
		F_XIB = {isa = PBXFileReference; path = View.xib; sourceTree = "<group>"; };
		F_UTIL = {isa = PBXFileReference; path = shared/util.c; sourceTree = SOURCE_ROOT; };
		T_APP = {isa = PBXNativeTarget; buildPhases = (P_SRC, P_RES, ); name = App; };
		P_SRC = {isa = PBXSourcesBuildPhase; files = (B_MAIN, B_VIEW, B_UTIL, B_PKG, ); };
		P_RES = {isa = PBXResourcesBuildPhase; files = (B_XIB, ); };
		B_MAIN = {isa = PBXBuildFile; fileRef = F_MAIN; };
		B_VIEW = {isa = PBXBuildFile; fileRef = F_VIEW; };
		B_UTIL = {isa = PBXBuildFile; fileRef = F_UTIL; };
		B_XIB = {isa = PBXBuildFile; fileRef = F_XIB; };
		B_PKG = {isa = PBXBuildFile; productRef = PKG; };
"#;

    fn crumbs(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn paths(files: &[ResolvedFile]) -> Vec<&str> {
        files.iter().map(|file| file.path.as_str()).collect()
    }

    #[test]
    fn lists_build_and_group_files_with_breadcrumbs() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(&path).unwrap();

        let listing = project.list_files("App", dir.path()).unwrap();
        assert_eq!(
            listing.build_files,
            vec![
                ResolvedFile::new("App/Views/View.m", crumbs(&["UI"])),
                ResolvedFile::new("App/main.m", Vec::new()),
                ResolvedFile::new("shared/util.c", crumbs(&["Shared"])),
            ]
        );
        assert_eq!(
            listing.other_files,
            vec![
                ResolvedFile::new("App/App.h", Vec::new()),
                ResolvedFile::new("App/Views/View.xib", crumbs(&["UI"])),
            ]
        );
    }

    #[test]
    fn listing_is_deterministic_and_sorted() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(&path).unwrap();

        let first = project.list_files("App", dir.path()).unwrap();
        let second = XcodeProject::from_path(&path)
            .unwrap()
            .list_files("App", dir.path())
            .unwrap();
        assert_eq!(first, second);
        for list in [&first.build_files, &first.other_files] {
            assert!(list.windows(2).all(|pair| pair[0].path <= pair[1].path));
        }
    }

    #[test]
    fn bundle_directory_loads_descriptor() {
        let dir = tempdir().unwrap();
        write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(dir.path().join("App.xcodeproj")).unwrap();
        assert_eq!(project.source_root(), dir.path());
        assert_eq!(project.target_names().unwrap(), vec!["App".to_string()]);
    }

    #[test]
    fn source_files_follow_sources_phase_order() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(&path).unwrap();

        let target_id = project.find_target("App").unwrap().unwrap();
        let target = project.graph().target(&target_id).unwrap();
        let files: Vec<ObjectId> = project
            .source_files(target)
            .collect::<Result<_>>()
            .unwrap();
        let ids: Vec<&str> = files.iter().map(ObjectId::as_str).collect();
        assert_eq!(ids, ["F_MAIN", "F_VIEW", "F_UTIL"]);
    }

    #[test]
    fn group_files_flatten_nested_groups() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(&path).unwrap();

        let group_id = project.find_target_group("App").unwrap();
        let group = project.graph().group(group_id).unwrap();
        let files: Vec<ObjectId> = project.group_files(group).collect::<Result<_>>().unwrap();
        let ids: Vec<&str> = files.iter().map(ObjectId::as_str).collect();
        assert_eq!(ids, ["F_MAIN", "F_HEADER", "F_VIEW", "F_XIB"]);
    }

    #[test]
    fn source_root_paths_ignore_group_nesting() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (OUTER, ); sourceTree = "<group>"; };
		OUTER = {isa = PBXGroup; children = (INNER, ); path = outer; sourceTree = "<group>"; };
		INNER = {isa = PBXGroup; children = (FILE, ); path = inner; sourceTree = "<group>"; };
		FILE = {isa = PBXFileReference; path = src/a.c; sourceTree = SOURCE_ROOT; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        let file = ObjectId::new("FILE");
        assert_eq!(project.file_path(&file).unwrap(), dir.path().join("src/a.c"));
        assert_eq!(project.resolve_path(&file, dir.path()).unwrap(), "src/a.c");
    }

    #[test]
    fn group_paths_accumulate_up_to_an_anchor() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; projectDirPath = ..; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (OUTER, ABS, ); sourceTree = "<group>"; };
		OUTER = {isa = PBXGroup; children = (PLAIN, ); path = outer; sourceTree = "<group>"; };
		PLAIN = {isa = PBXGroup; children = (INNER, ); name = Plain; sourceTree = "<group>"; };
		INNER = {isa = PBXGroup; children = (FILE, ); path = inner; sourceTree = "<group>"; };
		FILE = {isa = PBXFileReference; path = a.c; sourceTree = "<group>"; };
		ABS = {isa = PBXGroup; children = (LIB, ); path = /opt/lib; sourceTree = "<absolute>"; };
		LIB = {isa = PBXFileReference; path = include/lib.h; sourceTree = "<group>"; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        let root = dir.path().join("..");
        assert_eq!(project.source_root(), root.as_path());
        assert_eq!(
            project.file_path(&ObjectId::new("FILE")).unwrap(),
            root.join("outer").join("inner").join("a.c")
        );
        assert_eq!(
            project.file_path(&ObjectId::new("LIB")).unwrap(),
            PathBuf::from("/opt/lib/include/lib.h")
        );
    }

    #[test]
    fn unsupported_source_tree_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_APP, ); };
		MAIN = {isa = PBXGroup; children = (G_APP, ); sourceTree = "<group>"; };
		G_APP = {isa = PBXGroup; children = (F_MAIN, F_TOOL, ); name = App; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.c; sourceTree = "<group>"; };
		F_TOOL = {isa = PBXFileReference; path = usr/bin/tool; sourceTree = DEVELOPER_DIR; };
		T_APP = {isa = PBXNativeTarget; buildPhases = ( ); name = App; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        let err = project.list_files("App", dir.path()).unwrap_err();
        match err {
            XcodeError::UnsupportedRoot { id, source_tree } => {
                assert_eq!(id.as_str(), "F_TOOL");
                assert_eq!(source_tree, "DEVELOPER_DIR");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn same_path_from_distinct_nodes_appears_in_both_lists() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_APP, ); };
		MAIN = {isa = PBXGroup; children = (G_APP, F_TWIN, ); sourceTree = "<group>"; };
		G_APP = {isa = PBXGroup; children = (F_MAIN, ); path = App; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.c; sourceTree = "<group>"; };
		F_TWIN = {isa = PBXFileReference; path = App/main.c; sourceTree = SOURCE_ROOT; };
		T_APP = {isa = PBXNativeTarget; buildPhases = (P_SRC, ); name = App; };
		P_SRC = {isa = PBXSourcesBuildPhase; files = (B_TWIN, ); };
		B_TWIN = {isa = PBXBuildFile; fileRef = F_TWIN; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        let listing = project.list_files("App", dir.path()).unwrap();
        assert_eq!(paths(&listing.build_files), ["App/main.c"]);
        assert_eq!(paths(&listing.other_files), ["App/main.c"]);
    }

    #[test]
    fn ambiguous_target_group_degrades_to_build_files_only() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_APP, ); };
		MAIN = {isa = PBXGroup; children = (G_ONE, G_TWO, ); sourceTree = "<group>"; };
		G_ONE = {isa = PBXGroup; children = (F_MAIN, ); name = App; sourceTree = "<group>"; };
		G_TWO = {isa = PBXGroup; children = (F_OTHER, ); name = App; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.c; sourceTree = "<group>"; };
		F_OTHER = {isa = PBXFileReference; path = other.h; sourceTree = "<group>"; };
		T_APP = {isa = PBXNativeTarget; buildPhases = (P_SRC, ); name = App; };
		P_SRC = {isa = PBXSourcesBuildPhase; files = (B_MAIN, ); };
		B_MAIN = {isa = PBXBuildFile; fileRef = F_MAIN; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        assert!(project.find_target_group("App").is_none());
        let listing = project.list_files("App", dir.path()).unwrap();
        assert_eq!(listing.build_files, vec![ResolvedFile::new("main.c", Vec::new())]);
        assert!(listing.other_files.is_empty());
    }

    #[test]
    fn nested_group_sharing_target_name_is_not_the_target_group() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_APP, ); };
		MAIN = {isa = PBXGroup; children = (G_APP, G_DOCS, ); sourceTree = "<group>"; };
		G_APP = {isa = PBXGroup; children = (G_NAMELESS, ); name = App; sourceTree = "<group>"; };
		G_NAMELESS = {isa = PBXGroup; children = (F_MAIN, ); sourceTree = "<group>"; };
		G_DOCS = {isa = PBXGroup; children = (G_DOCS_APP, ); name = Docs; sourceTree = "<group>"; };
		G_DOCS_APP = {isa = PBXGroup; children = (F_NOTES, ); name = App; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.c; sourceTree = "<group>"; };
		F_NOTES = {isa = PBXFileReference; path = notes.md; sourceTree = "<group>"; };
		T_APP = {isa = PBXNativeTarget; buildPhases = (P_SRC, ); name = App; };
		P_SRC = {isa = PBXSourcesBuildPhase; files = (B_MAIN, ); };
		B_MAIN = {isa = PBXBuildFile; fileRef = F_MAIN; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        assert_eq!(
            project.find_target_group("App").map(ObjectId::as_str),
            Some("G_APP")
        );
        let listing = project.list_files("App", dir.path()).unwrap();
        assert_eq!(
            listing.build_files,
            vec![ResolvedFile::new("main.c", crumbs(&[UNNAMED_GROUP]))]
        );
        assert!(listing.other_files.is_empty());
    }

    #[test]
    fn target_group_must_sit_below_the_main_group() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_APP, ); };
		MAIN = {isa = PBXGroup; children = (G_APP, G_LOOSE, ); sourceTree = "<group>"; };
		G_APP = {isa = PBXGroup; children = (F_MAIN, ); name = App; sourceTree = "<group>"; };
		G_LOOSE = {isa = PBXGroup; children = (G_SHADOW, ); sourceTree = "<group>"; };
		G_SHADOW = {isa = PBXGroup; children = (F_NOTES, ); name = App; sourceTree = "<group>"; };
		F_MAIN = {isa = PBXFileReference; path = main.c; sourceTree = "<group>"; };
		F_NOTES = {isa = PBXFileReference; path = notes.md; sourceTree = "<group>"; };
		T_APP = {isa = PBXNativeTarget; buildPhases = ( ); name = App; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        assert_eq!(
            project.find_target_group("App").map(ObjectId::as_str),
            Some("G_APP")
        );
        let listing = project.list_files("App", dir.path()).unwrap();
        assert_eq!(paths(&listing.other_files), ["main.c"]);
    }

    #[test]
    fn duplicate_target_names_are_ambiguous() {
        let dir = tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "App.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_ONE, T_TWO, ); };
		MAIN = {isa = PBXGroup; children = ( ); sourceTree = "<group>"; };
		T_ONE = {isa = PBXNativeTarget; buildPhases = ( ); name = App; };
		T_TWO = {isa = PBXAggregateTarget; buildPhases = ( ); name = App; };
"#,
        );
        let project = XcodeProject::from_path(&path).unwrap();

        let err = project.list_files("App", dir.path()).unwrap_err();
        assert!(matches!(err, XcodeError::AmbiguousTarget { count: 2, .. }));
    }

    #[test]
    fn missing_target_is_reported() {
        let dir = tempdir().unwrap();
        let path = write_project(dir.path(), "App.xcodeproj", APP_OBJECTS);
        let project = XcodeProject::from_path(&path).unwrap();

        let err = project.list_files("app", dir.path()).unwrap_err();
        assert!(matches!(err, XcodeError::TargetNotFound { .. }));
    }

    const OUTER_OBJECTS: &str = r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (F_LIB, ); sourceTree = "<group>"; };
		F_LIB = {isa = PBXFileReference; path = Lib/Lib.xcodeproj; sourceTree = "<group>"; };
		PROXY = {isa = PBXContainerItemProxy; containerPortal = F_LIB; proxyType = 1; remoteGlobalIDString = T_LIB; remoteInfo = Lib; };
		SELF_PROXY = {isa = PBXContainerItemProxy; containerPortal = ROOT; proxyType = 1; remoteGlobalIDString = T_X; remoteInfo = Lib; };
"#;

    const LIB_OBJECTS: &str = r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = (T_LIB, ); };
		MAIN = {isa = PBXGroup; children = (G_LIB, ); sourceTree = "<group>"; };
		G_LIB = {isa = PBXGroup; children = (F_LIB_C, F_LIB_H, ); name = Lib; path = src; sourceTree = "<group>"; };
		F_LIB_C = {isa = PBXFileReference; path = lib.c; sourceTree = "<group>"; };
		F_LIB_H = {isa = PBXFileReference; path = lib.h; sourceTree = "<group>"; };
		T_LIB = {isa = PBXNativeTarget; buildPhases = (P_SRC, ); name = Lib; };
		P_SRC = {isa = PBXSourcesBuildPhase; files = (B_LIB_C, ); };
		B_LIB_C = {isa = PBXBuildFile; fileRef = F_LIB_C; };
"#;

    #[test]
    fn delegates_to_referenced_project() {
        let dir = tempdir().unwrap();
        let outer_path = write_project(dir.path(), "Outer.xcodeproj", OUTER_OBJECTS);
        let lib_path = write_project(&dir.path().join("Lib"), "Lib.xcodeproj", LIB_OBJECTS);

        let outer = XcodeProject::from_path(&outer_path).unwrap();
        let lib = XcodeProject::from_path(&lib_path).unwrap();

        assert!(outer.find_target("Lib").unwrap().is_none());
        let referenced = outer.find_referenced_target("Lib").unwrap().unwrap();
        assert_eq!(referenced.path(), lib_path.as_path());

        let delegated = outer.list_files("Lib", dir.path()).unwrap();
        assert_eq!(delegated, lib.list_files("Lib", dir.path()).unwrap());
        assert_eq!(paths(&delegated.build_files), ["Lib/src/lib.c"]);
        assert_eq!(paths(&delegated.other_files), ["Lib/src/lib.h"]);
    }

    #[test]
    fn unusable_proxies_are_skipped_for_later_ones() {
        let dir = tempdir().unwrap();
        let outer_path = write_project(
            dir.path(),
            "Outer.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (F_LIB, F_SDK, ); sourceTree = "<group>"; };
		F_LIB = {isa = PBXFileReference; path = Lib/Lib.xcodeproj; sourceTree = "<group>"; };
		F_SDK = {isa = PBXFileReference; path = Lib.xcodeproj; sourceTree = SDKROOT; };
		A_DANGLING = {isa = PBXContainerItemProxy; containerPortal = GONE; proxyType = 2; remoteInfo = Lib; };
		B_SDK = {isa = PBXContainerItemProxy; containerPortal = F_SDK; proxyType = 2; remoteInfo = Lib; };
		C_PROXY = {isa = PBXContainerItemProxy; containerPortal = F_LIB; proxyType = 1; remoteInfo = Lib; };
"#,
        );
        let lib_path = write_project(&dir.path().join("Lib"), "Lib.xcodeproj", LIB_OBJECTS);

        let outer = XcodeProject::from_path(&outer_path).unwrap();
        let referenced = outer.find_referenced_target("Lib").unwrap().unwrap();
        assert_eq!(referenced.path(), lib_path.as_path());

        let listing = outer.list_files("Lib", dir.path()).unwrap();
        assert_eq!(paths(&listing.build_files), ["Lib/src/lib.c"]);
    }

    #[test]
    fn delegation_without_hops_is_rejected() {
        let dir = tempdir().unwrap();
        let outer_path = write_project(dir.path(), "Outer.xcodeproj", OUTER_OBJECTS);
        write_project(&dir.path().join("Lib"), "Lib.xcodeproj", LIB_OBJECTS);

        let outer = XcodeProject::from_path(&outer_path).unwrap();
        let err = outer.list_files_with_depth("Lib", dir.path(), 0).unwrap_err();
        assert!(matches!(err, XcodeError::DelegationDepthExceeded { limit: 0, .. }));
    }

    #[test]
    fn delegation_cycle_stops_at_depth_limit() {
        let dir = tempdir().unwrap();
        let first = write_project(
            dir.path(),
            "First.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (F_OTHER, ); sourceTree = "<group>"; };
		F_OTHER = {isa = PBXFileReference; path = Second.xcodeproj; sourceTree = "<group>"; };
		PROXY = {isa = PBXContainerItemProxy; containerPortal = F_OTHER; proxyType = 1; remoteInfo = Ghost; };
"#,
        );
        write_project(
            dir.path(),
            "Second.xcodeproj",
            r#"
		ROOT = {isa = PBXProject; mainGroup = MAIN; targets = ( ); };
		MAIN = {isa = PBXGroup; children = (F_OTHER, ); sourceTree = "<group>"; };
		F_OTHER = {isa = PBXFileReference; path = First.xcodeproj; sourceTree = "<group>"; };
		PROXY = {isa = PBXContainerItemProxy; containerPortal = F_OTHER; proxyType = 1; remoteInfo = Ghost; };
"#,
        );

        let project = XcodeProject::from_path(&first).unwrap();
        let err = project.list_files("Ghost", dir.path()).unwrap_err();
        assert!(matches!(err, XcodeError::DelegationDepthExceeded { limit: 1, .. }));
    }

    #[test]
    fn malformed_descriptor_fails_to_load() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("App.xcodeproj");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join(DESCRIPTOR_FILE), "{ objects = { ").unwrap();
        assert!(matches!(
            XcodeProject::from_path(&bundle).unwrap_err(),
            XcodeError::Plist { .. }
        ));

        fs::write(bundle.join(DESCRIPTOR_FILE), "{ rootObject = X; }").unwrap();
        assert!(matches!(
            XcodeProject::from_path(&bundle).unwrap_err(),
            XcodeError::Graph { .. }
        ));

        assert!(matches!(
            XcodeProject::from_path(dir.path().join("Missing.xcodeproj")).unwrap_err(),
            XcodeError::Io { .. }
        ));
    }
}
