use projsync_paths::{FileListing, PathError, ResolvedFile};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
const FILTERS_SUFFIX: &str = ".filters";

/// Errors that can occur when reading Visual Studio solutions and projects.
#[derive(Debug, Error)]
pub enum VisualStudioError {
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse XML in {path:?}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("Invalid Visual Studio project {path:?}: root element is not an MSBuild Project")]
    InvalidProject { path: PathBuf },
    #[error("Missing filter file {path:?}")]
    MissingFilters { path: PathBuf },
    #[error("No such target {name} in {path:?}")]
    TargetNotFound { name: String, path: PathBuf },
    #[error("Target {requested} does not match project {project}")]
    TargetMismatch { requested: String, project: String },
    #[error(transparent)]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, VisualStudioError>;

/// A Visual Studio solution (.sln) used as a registry of C/C++ projects.
#[derive(Debug, Clone)]
pub struct Solution {
    pub name: String,
    pub path: PathBuf,
    pub projects: Vec<SolutionProject>,
}

/// A .vcxproj entry registered in a solution.
#[derive(Debug, Clone)]
pub struct SolutionProject {
    pub name: String,
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
    pub project_type_guid: Option<String>,
    pub project_guid: Option<String>,
}

/// A Visual Studio C/C++ project (.vcxproj) together with its .filters sidecar.
#[derive(Debug, Clone)]
pub struct VcxProject {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<VcxItem>,
    pub filters: VcxFilters,
}

/// A file entry inside a Visual Studio C/C++ project.
#[derive(Debug, Clone)]
pub struct VcxItem {
    /// The `Include` attribute exactly as written.
    pub include: String,
    pub relative_path: PathBuf,
    pub kind: VcxItemKind,
}

/// Categorization of file entries from a Visual Studio C/C++ project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcxItemKind {
    Source,
    Header,
    None,
    Resource,
    Custom,
    Image,
    Other,
}

/// Filter assignments read from a `.vcxproj.filters` file, keyed by `Include`.
#[derive(Debug, Clone, Default)]
pub struct VcxFilters {
    pub path: PathBuf,
    entries: HashMap<String, String>,
}

impl Solution {
    /// Parse a Visual Studio solution file from disk.
    ///
    /// Only `Project(...)` lines whose path names a .vcxproj are kept; every
    /// other line is ignored.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| VisualStudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        let mut projects: Vec<SolutionProject> = Vec::new();

        for (line_number, line) in contents.lines().enumerate() {
            let trimmed = line.trim_start();
            if !trimmed.starts_with("Project(") {
                continue;
            }

            let entry = match parse_project_line(trimmed) {
                Ok(entry) => entry,
                Err(message) => {
                    tracing::warn!(
                        "Skipping solution entry in {} at line {}: {}",
                        path.display(),
                        line_number + 1,
                        message
                    );
                    continue;
                }
            };

            let relative_path = projsync_paths::from_windows(&entry.relative_path);
            let is_vcxproj = relative_path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("vcxproj"))
                == Some(true);
            if !is_vcxproj {
                continue;
            }

            if projects.iter().any(|project| project.name == entry.name) {
                tracing::warn!(
                    "Duplicate project {} in {}, keeping the first entry",
                    entry.name,
                    path.display()
                );
                continue;
            }

            let absolute_path = projsync_paths::lexical_normalize(&base_dir.join(&relative_path));
            projects.push(SolutionProject {
                name: entry.name,
                relative_path,
                absolute_path,
                project_type_guid: entry.project_type_guid,
                project_guid: entry.project_guid,
            });
        }

        Ok(Solution {
            name: file_stem(path),
            path: path.to_path_buf(),
            projects,
        })
    }

    pub fn find_project(&self, name: &str) -> Option<&SolutionProject> {
        self.projects.iter().find(|project| project.name == name)
    }

    pub fn target_names(&self) -> Vec<String> {
        self.projects.iter().map(|project| project.name.clone()).collect()
    }

    /// Look up `target` in the registry and list the files of its project.
    pub fn list_files(&self, target: &str, base_dir: &Path) -> Result<FileListing> {
        let project = self
            .find_project(target)
            .ok_or_else(|| VisualStudioError::TargetNotFound {
                name: target.to_string(),
                path: self.path.clone(),
            })?;
        tracing::debug!(
            "Solution {} maps {} to {}",
            self.name,
            target,
            project.absolute_path.display()
        );
        VcxProject::from_path(&project.absolute_path)?.list_files(target, base_dir)
    }
}

impl VcxProject {
    /// Parse a Visual Studio C/C++ project and its filter file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = read_file(path)?;
        let document = parse_msbuild(path, &contents)?;

        let mut files = Vec::new();
        for node in item_nodes(&document) {
            let Some(kind) = VcxItemKind::from_tag(node.tag_name().name()) else {
                continue;
            };
            let Some(include) = node.attribute("Include") else {
                continue;
            };
            match normalize_include(include) {
                Some(relative_path) => files.push(VcxItem {
                    include: include.to_string(),
                    relative_path,
                    kind,
                }),
                None => tracing::debug!("Skipping unresolvable include {:?}", include),
            }
        }

        let filters = VcxFilters::from_path(filters_path(path))?;

        Ok(VcxProject {
            name: file_stem(path),
            path: path.to_path_buf(),
            files,
            filters,
        })
    }

    pub fn project_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Fail unless `target` names this project.
    pub fn ensure_target(&self, target: &str) -> Result<()> {
        if self.name == target {
            Ok(())
        } else {
            Err(VisualStudioError::TargetMismatch {
                requested: target.to_string(),
                project: self.name.clone(),
            })
        }
    }

    /// List compiled files and other referenced files with their filter breadcrumbs.
    ///
    /// A project file describes exactly one target, so `_target` is not used to
    /// filter anything; see [`VcxProject::ensure_target`] for a strict check.
    pub fn list_files(&self, _target: &str, base_dir: &Path) -> Result<FileListing> {
        let build_files = self.resolve_kinds(&[VcxItemKind::Source], base_dir)?;
        let other_files = self.resolve_kinds(
            &[
                VcxItemKind::Header,
                VcxItemKind::None,
                VcxItemKind::Resource,
                VcxItemKind::Custom,
                VcxItemKind::Image,
                VcxItemKind::Other,
            ],
            base_dir,
        )?;

        let build_files = projsync_paths::dedup_by_path(build_files);
        let other_files =
            projsync_paths::exclude_paths(projsync_paths::dedup_by_path(other_files), &build_files);
        Ok(FileListing::new(build_files, other_files))
    }

    fn resolve_kinds(&self, kinds: &[VcxItemKind], base_dir: &Path) -> Result<Vec<ResolvedFile>> {
        let project_dir = self.project_dir();
        let mut resolved = Vec::new();

        for kind in kinds {
            for item in self.files.iter().filter(|item| item.kind == *kind) {
                let path = projsync_paths::normalize(project_dir, &item.relative_path, base_dir)?;
                let breadcrumb = match self.filters.breadcrumb(&item.include) {
                    Some(breadcrumb) => breadcrumb,
                    None => {
                        tracing::warn!(
                            "No filter entry for {} in {}",
                            item.include,
                            self.filters.path.display()
                        );
                        Vec::new()
                    }
                };
                resolved.push(ResolvedFile::new(path, breadcrumb));
            }
        }

        Ok(resolved)
    }
}

impl VcxFilters {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VisualStudioError::MissingFilters {
                path: path.to_path_buf(),
            });
        }
        let contents = read_file(path)?;
        let document = parse_msbuild(path, &contents)?;

        let mut entries = HashMap::new();
        for node in item_nodes(&document) {
            if node.tag_name().name() == "Filter" {
                continue;
            }
            let Some(include) = node.attribute("Include") else {
                continue;
            };
            let filter = node
                .children()
                .find(|child| child.is_element() && child.tag_name().name() == "Filter")
                .and_then(|child| child.text())
                .unwrap_or("")
                .trim()
                .to_string();
            entries.entry(include.to_string()).or_insert(filter);
        }

        Ok(VcxFilters {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Folder names for `include`, outermost first; `None` if the file has no entry.
    pub fn breadcrumb(&self, include: &str) -> Option<Vec<String>> {
        self.entries.get(include).map(|filter| {
            filter
                .split('\\')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VcxItemKind {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "ClCompile" => VcxItemKind::Source,
            "ClInclude" => VcxItemKind::Header,
            "None" => VcxItemKind::None,
            "ResourceCompile" => VcxItemKind::Resource,
            "CustomBuild" => VcxItemKind::Custom,
            "Image" => VcxItemKind::Image,
            "Text" => VcxItemKind::Other,
            "Natvis" => VcxItemKind::Other,
            _ => return None,
        })
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| VisualStudioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_msbuild<'a>(path: &Path, contents: &'a str) -> Result<Document<'a>> {
    let document = Document::parse(contents).map_err(|source| VisualStudioError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    let root = document.root_element();
    if root.tag_name().name() != "Project" || root.tag_name().namespace() != Some(MSBUILD_NAMESPACE)
    {
        return Err(VisualStudioError::InvalidProject {
            path: path.to_path_buf(),
        });
    }
    Ok(document)
}

/// Element children of every top-level `ItemGroup`, in document order.
fn item_nodes<'a, 'input>(
    document: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    document
        .root_element()
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "ItemGroup")
        .flat_map(|group| group.children().filter(|node| node.is_element()))
}

fn filters_path(project: &Path) -> PathBuf {
    let mut name = project.as_os_str().to_os_string();
    name.push(FILTERS_SUFFIX);
    PathBuf::from(name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

struct ProjectLine {
    name: String,
    relative_path: String,
    project_type_guid: Option<String>,
    project_guid: Option<String>,
}

fn parse_project_line(line: &str) -> std::result::Result<ProjectLine, String> {
    let rest = line
        .strip_prefix("Project(")
        .ok_or_else(|| "Missing Project prefix".to_string())?;
    let (type_guid_raw, remainder) = rest
        .split_once(')')
        .ok_or_else(|| "Missing closing ')' for project type".to_string())?;
    let values = remainder
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| "Missing '=' after project type".to_string())?
        .trim();

    let mut parts = values.split(',');
    let name_part = parts
        .next()
        .ok_or_else(|| "Missing project name".to_string())?;
    let path_part = parts
        .next()
        .ok_or_else(|| "Missing project path".to_string())?;
    let guid_part = parts.next().unwrap_or("");

    Ok(ProjectLine {
        name: trim_quotes(name_part)?,
        relative_path: trim_quotes(path_part)?,
        project_type_guid: trim_guid(type_guid_raw),
        project_guid: trim_guid(guid_part),
    })
}

fn trim_quotes(value: &str) -> std::result::Result<String, String> {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Ok(stripped.to_string())
    } else {
        Err(format!("Expected quoted string, found: {value}"))
    }
}

fn trim_guid(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let stripped = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed);
    let stripped = stripped
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(stripped)
        .trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

fn normalize_include(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("$(") || trimmed.contains("%(") {
        return None;
    }
    Some(projsync_paths::from_windows(trimmed))
}
